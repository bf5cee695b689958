use anirl::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;

/// End-to-end on a deterministic 3x3 grid: fit the expert on the true
/// reward, hand its demonstrations to the projection loop and check the
/// recovered behavior closes in on the expert's.
#[test]
fn recovers_expert_like_behavior_on_a_small_grid() {
    let mdp: Rc<dyn MdpAdapter> = Rc::new(GridWorld::new(3, 3, 0.0));
    let rng = &mut StdRng::seed_from_u64(2718);

    let batch = SampleBatch::random_walk(mdp.as_ref(), 2000, rng).unwrap();
    let expert = lspi(
        mdp.as_ref(),
        &batch,
        &PolicyWeights::zeros(mdp.phi_dim()),
        &RewardSource::Observed,
        &LspiParams::default(),
    )
    .unwrap();
    assert!(expert.converged);

    // The expert must actually solve the task: greedy play from (1, 1)
    // reaches the goal well inside the discount horizon.
    let mut state = vec![1.0, 1.0];
    let mut steps = 0;
    loop {
        let a = greedy_action(mdp.as_ref(), &expert.weights, &state).unwrap();
        let step = mdp.simulate(&state, a, rng);
        steps += 1;
        if step.done {
            break;
        }
        state = step.next_state;
        assert!(steps < 20, "expert never reached the goal");
    }
    assert!(steps <= 6, "expert path is far from optimal: {steps} steps");

    let mc = McParams {
        gamma: 0.9,
        num_rollouts: 30,
        horizon: 50,
    };
    let demos = estimate_fe_mc(mdp.as_ref(), &expert.weights, &mc, rng).unwrap();
    let expert_ref = ExpertReference::from(&demos);

    let projection = ProjectionLoop::new(
        Rc::clone(&mdp),
        Rc::new(MonteCarloEstimator { params: mc }),
        AnirlParams {
            epsilon: 0.05,
            max_iterations: 12,
            ..AnirlParams::default()
        },
    );
    let outcome = projection.run(&expert_ref, &batch, None, rng).unwrap();

    for pair in outcome.margins.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-9);
    }
    assert!(outcome.best.fe_distance <= outcome.margins[0] + 1e-9);
    assert!(outcome.best.fe_distance.is_finite());
    assert!(outcome.best.true_error.is_some());

    for (i, report) in outcome.reports.iter().enumerate() {
        assert_eq!(report.iteration, i + 1);
        assert_eq!(report.sample_count, batch.len());
    }
}
