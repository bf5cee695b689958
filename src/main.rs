use anirl::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;

/// Expert demonstration counts for the estimator-comparison curves.
const EXPERT_ROLLOUT_LADDER: [usize; 7] = [1, 10, 30, 50, 75, 100, 200];

fn main() {
    tracing_subscriber::fmt::init();

    let domain = std::env::args().nth(1).unwrap_or_else(|| "gridworld".into());
    match domain.as_str() {
        "gridworld" => run_gridworld(),
        "pendulum" => run_pendulum(),
        other => {
            eprintln!("unknown domain {other:?}, expected gridworld or pendulum");
            std::process::exit(2);
        }
    }
}

/// Grid-world experiment: fit the expert with LSPI on the true reward, then
/// recover a reward from its demonstrations. Curve A traces the Monte-Carlo
/// projection loop per iteration; curves B and C compare LSTD-mu against
/// Monte-Carlo across expert demonstration counts.
fn run_gridworld() {
    let mdp: Rc<dyn MdpAdapter> = Rc::new(GridWorld::new(5, 5, 0.3));
    let rng = &mut StdRng::seed_from_u64(2718);

    let batch = SampleBatch::random_walk(mdp.as_ref(), 5000, rng).expect("exploration batch");
    let expert = fit_expert(mdp.as_ref(), &batch, &LspiParams::default());

    let mc = McParams {
        num_rollouts: 500,
        horizon: 100,
        ..McParams::default()
    };
    let expert_rollouts =
        estimate_fe_mc(mdp.as_ref(), &expert, &mc, rng).expect("expert feature expectation");
    let expert_ref = ExpertReference::from(&expert_rollouts);

    let loop_mc = ProjectionLoop::new(
        Rc::clone(&mdp),
        Rc::new(MonteCarloEstimator { params: mc.clone() }),
        AnirlParams::default(),
    );
    let outcome = loop_mc
        .run(&expert_ref, &batch, None, rng)
        .expect("monte-carlo projection");
    for report in &outcome.reports {
        print_curve_line("A", report.sample_count, &report.best);
    }

    for m in EXPERT_ROLLOUT_LADDER {
        // Each ladder point is an independent experiment on fresh expert
        // demonstrations.
        let demos = estimate_fe_mc(
            mdp.as_ref(),
            &expert,
            &McParams {
                num_rollouts: m,
                horizon: 100,
                ..McParams::default()
            },
            rng,
        )
        .expect("expert demonstrations");
        let nb_samples = demos.batch.len();
        let expert_ref = ExpertReference::from(&demos);

        let loop_lstd = ProjectionLoop::new(
            Rc::clone(&mdp),
            Rc::new(LstdMuEstimator {
                params: LstdMuParams::default(),
            }),
            AnirlParams::default(),
        );
        let outcome = loop_lstd
            .run(&expert_ref, &demos.batch, None, rng)
            .expect("lstd-mu projection");
        print_curve_line("B", nb_samples, &outcome.best);

        let outcome = loop_mc
            .run(&expert_ref, &batch, None, rng)
            .expect("monte-carlo projection");
        print_curve_line("C", nb_samples, &outcome.best);
    }

    print_summary("gridworld", &outcome_summary(&outcome));
}

/// Pendulum experiment: same recovery, Monte-Carlo estimator only.
fn run_pendulum() {
    let mdp: Rc<dyn MdpAdapter> = Rc::new(InvertedPendulum::new());
    let rng = &mut StdRng::seed_from_u64(2718);

    let batch = SampleBatch::random_walk(mdp.as_ref(), 5000, rng).expect("exploration batch");
    let lspi_params = LspiParams {
        max_iterations: 10,
        ..LspiParams::default()
    };
    let expert = fit_expert(mdp.as_ref(), &batch, &lspi_params);

    let mc = McParams {
        num_rollouts: 100,
        horizon: 70,
        ..McParams::default()
    };
    let expert_rollouts =
        estimate_fe_mc(mdp.as_ref(), &expert, &mc, rng).expect("expert feature expectation");
    let expert_ref = ExpertReference::from(&expert_rollouts);

    let projection = ProjectionLoop::new(
        Rc::clone(&mdp),
        Rc::new(MonteCarloEstimator { params: mc }),
        AnirlParams {
            lspi: lspi_params,
            ..AnirlParams::default()
        },
    );
    let outcome = projection
        .run(&expert_ref, &batch, None, rng)
        .expect("monte-carlo projection");
    for report in &outcome.reports {
        print_curve_line("A", report.sample_count, &report.best);
    }

    print_summary("pendulum", &outcome_summary(&outcome));
}

fn fit_expert(mdp: &dyn MdpAdapter, batch: &SampleBatch, params: &LspiParams) -> PolicyWeights {
    let out = lspi(
        mdp,
        batch,
        &PolicyWeights::zeros(mdp.phi_dim()),
        &RewardSource::Observed,
        params,
    )
    .expect("expert policy");
    out.weights
}

fn print_curve_line(curve: &str, nb_samples: usize, best: &AcceptanceRecord) {
    let true_error = best
        .true_error
        .map_or_else(|| "nan".to_string(), |e| format!("{e:.6}"));
    println!(
        "{curve} {nb_samples} {:.6} {:.6} {true_error} {:.6}",
        best.t_stat, best.est_error, best.fe_distance
    );
}

fn outcome_summary(outcome: &AnirlOutcome) -> serde_json::Value {
    serde_json::json!({
        "reward_weights": outcome.reward_weights.as_vector().as_slice(),
        "best": &outcome.best,
        "converged": outcome.converged,
        "iterations": outcome.margins.len(),
    })
}

fn print_summary(domain: &str, summary: &serde_json::Value) {
    println!(
        "{}",
        serde_json::json!({ "domain": domain, "result": summary })
    );
}
