//! Least-squares policy iteration over a fixed transition batch.
//!
//! Ref: Lagoudakis & Parr 2003, https://www.jmlr.org/papers/v4/lagoudakis03a.html

use super::super::samples::{SampleBatch, TransitionSample};
use super::super::{expect_dim, Continous, MdpAdapter, PolicyWeights, RewardWeights};
use super::{lstd_system, solve_checked};
use crate::errors::Result;
use nalgebra::DMatrix;
use tracing::debug;

/// One LSTD-Q fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LstdqParams {
    pub gamma: Continous,
    pub lambda: Continous,
}

impl Default for LstdqParams {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            lambda: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LspiParams {
    pub lstdq: LstdqParams,
    /// Stop once successive weight vectors are closer than this.
    pub epsilon: Continous,
    pub max_iterations: usize,
}

impl Default for LspiParams {
    fn default() -> Self {
        Self {
            lstdq: LstdqParams::default(),
            epsilon: 0.01,
            max_iterations: 20,
        }
    }
}

/// Which reward the fit regresses against: the rewards recorded in the batch,
/// or a linear hypothesis `theta . psi(s)` over the same samples. The latter
/// is how the projection loop re-weights one batch per outer iteration.
#[derive(Debug, Clone, Copy)]
pub enum RewardSource<'a> {
    Observed,
    Hypothesis(&'a RewardWeights),
}

impl RewardSource<'_> {
    fn reward(&self, mdp: &dyn MdpAdapter, sample: &TransitionSample) -> Result<Continous> {
        match self {
            Self::Observed => Ok(sample.reward),
            Self::Hypothesis(theta) => {
                expect_dim("reward weights", mdp.psi_dim(), theta.dim())?;
                let psi = mdp.psi(&sample.state);
                expect_dim("psi", mdp.psi_dim(), psi.len())?;
                Ok(theta.reward(&psi))
            }
        }
    }
}

/// Fits Q-value weights for the greedy policy implied by `policy` by solving
/// the ridge-regularized LSTD-Q normal equations over the batch.
pub fn lstdq(
    mdp: &dyn MdpAdapter,
    batch: &SampleBatch,
    policy: &PolicyWeights,
    reward: &RewardSource,
    params: &LstdqParams,
) -> Result<PolicyWeights> {
    let k = mdp.phi_dim();
    let mut b = DMatrix::<Continous>::zeros(k, 1);
    let a = lstd_system(
        mdp,
        batch,
        policy,
        params.gamma,
        params.lambda,
        |sample, phi_t| {
            let r = reward.reward(mdp, sample)?;
            b += phi_t * r;
            Ok(())
        },
    )?;

    let omega = solve_checked(a, &b)?;
    Ok(PolicyWeights::new(omega.column(0).into_owned()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LspiOutcome {
    pub weights: PolicyWeights,
    pub iterations: usize,
    /// False when the iteration cap ran out first; the weights are then the
    /// best available approximation, not a fixed point.
    pub converged: bool,
}

/// Policy iteration: repeat the LSTD-Q fit, each round evaluating the greedy
/// policy of the previous round's weights, until the weight vector stops
/// moving or the iteration budget runs out.
pub fn lspi(
    mdp: &dyn MdpAdapter,
    batch: &SampleBatch,
    omega_0: &PolicyWeights,
    reward: &RewardSource,
    params: &LspiParams,
) -> Result<LspiOutcome> {
    expect_dim("initial weights", mdp.phi_dim(), omega_0.dim())?;

    let mut omega = omega_0.clone();
    let mut iterations = 0;
    let mut converged = false;
    while iterations < params.max_iterations {
        let omega_dash = lstdq(mdp, batch, &omega, reward, &params.lstdq)?;
        let diff = (omega_dash.as_vector() - omega.as_vector()).norm();
        iterations += 1;
        debug!(iterations, diff, "lspi step");
        omega = omega_dash;
        if diff < params.epsilon {
            converged = true;
            break;
        }
    }

    Ok(LspiOutcome {
        weights: omega,
        iterations,
        converged,
    })
}
