//! Monte-Carlo estimation of a policy's discounted feature expectation.
//!
//! Unbiased but high-variance for few rollouts; needs a live simulator,
//! unlike the LSTD-mu estimator next door.

use super::super::greedy::greedy_action;
use super::super::samples::{SampleBatch, TransitionSample};
use super::super::{expect_dim, Continous, FeatureExpectation, MdpAdapter, PolicyWeights};
use crate::errors::{Error, Result};
use nalgebra::DVector;
use rand::rngs::StdRng;

#[derive(Debug, Clone, PartialEq)]
pub struct McParams {
    pub gamma: Continous,
    pub num_rollouts: usize,
    /// Steps per rollout when the domain does not terminate first.
    pub horizon: usize,
}

impl Default for McParams {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            num_rollouts: 500,
            horizon: 3000,
        }
    }
}

/// Everything a batch of rollouts yields: the mean discounted feature count,
/// the per-rollout counts (for paired statistics), the per-rollout discounted
/// returns under the simulator's own reward (for ground-truth diagnostics)
/// and the observed transitions, reusable as a sample batch.
#[derive(Debug, Clone)]
pub struct McRollouts {
    pub mu: FeatureExpectation,
    pub per_rollout: Vec<DVector<Continous>>,
    pub returns: Vec<Continous>,
    pub batch: SampleBatch,
}

/// Rolls out the greedy policy of `policy` from the initial-state
/// distribution `num_rollouts` times, accumulating `sum_t gamma^t psi(s_t)`
/// per trajectory, and averages.
pub fn estimate_fe_mc(
    mdp: &dyn MdpAdapter,
    policy: &PolicyWeights,
    params: &McParams,
    rng: &mut StdRng,
) -> Result<McRollouts> {
    if params.num_rollouts == 0 {
        return Err(Error::EmptyInput("rollout count"));
    }
    if params.horizon == 0 {
        return Err(Error::EmptyInput("rollout horizon"));
    }
    expect_dim("policy weights", mdp.phi_dim(), policy.dim())?;

    let p = mdp.psi_dim();
    let mut sum = DVector::<Continous>::zeros(p);
    let mut per_rollout = Vec::with_capacity(params.num_rollouts);
    let mut returns = Vec::with_capacity(params.num_rollouts);
    let mut samples = Vec::new();

    for _ in 0..params.num_rollouts {
        let mut state = mdp.initial_state(rng);
        let mut mu_i = DVector::<Continous>::zeros(p);
        let mut ret = 0.0;
        let mut discount = 1.0;

        for _ in 0..params.horizon {
            let psi = mdp.psi(&state);
            expect_dim("psi", p, psi.len())?;
            mu_i += psi * discount;

            let action = greedy_action(mdp, policy, &state)?;
            let step = mdp.simulate(&state, action, rng);
            ret += discount * step.reward;
            samples.push(TransitionSample {
                state: state.clone(),
                action,
                reward: step.reward,
                next_state: step.next_state.clone(),
                done: step.done,
            });

            discount *= params.gamma;
            if step.done {
                break;
            }
            state = step.next_state;
        }

        sum += &mu_i;
        per_rollout.push(mu_i);
        returns.push(ret);
    }

    Ok(McRollouts {
        mu: FeatureExpectation::new(sum / params.num_rollouts as Continous),
        per_rollout,
        returns,
        batch: SampleBatch::new(samples)?,
    })
}
