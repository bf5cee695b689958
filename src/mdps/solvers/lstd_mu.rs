//! LSTD-mu: least-squares temporal-difference estimation of a policy's
//! discounted feature expectation from a fixed sample batch.
//!
//! Same normal equations as LSTD-Q with the scalar reward target swapped for
//! the state-feature vector, so no simulator is needed beyond drawing
//! initial states. Ref: Klein, Geist & Pietquin 2011, "Batch, Off-policy and
//! Model-free Apprenticeship Learning".

use super::super::greedy::greedy_action;
use super::super::samples::SampleBatch;
use super::super::{expect_dim, Continous, FeatureExpectation, MdpAdapter, PolicyWeights};
use crate::errors::{Error, Result};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;

#[derive(Debug, Clone, PartialEq)]
pub struct LstdMuParams {
    pub gamma: Continous,
    pub lambda: Continous,
    /// Initial-state draws to average the estimate over; 1 suffices for a
    /// deterministic initial-state distribution.
    pub num_initial_states: usize,
}

impl Default for LstdMuParams {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            lambda: 0.1,
            num_initial_states: 1,
        }
    }
}

/// Solves `(A + lambda I) Xi = sum phi(s,a) psi(s)^T` for the K x P
/// coefficient matrix `Xi`, then reads the feature expectation off as
/// `Xi^T phi(s0, pi(s0))` averaged over initial-state draws.
///
/// The evaluation policy is held fixed, so the single exact solve already is
/// the converged mu fixed point.
pub fn estimate_fe_lstd(
    mdp: &dyn MdpAdapter,
    batch: &SampleBatch,
    policy: &PolicyWeights,
    params: &LstdMuParams,
    rng: &mut StdRng,
) -> Result<FeatureExpectation> {
    if params.num_initial_states == 0 {
        return Err(Error::EmptyInput("initial-state draws"));
    }

    let k = mdp.phi_dim();
    let p = mdp.psi_dim();
    let mut b = DMatrix::<Continous>::zeros(k, p);
    let a = super::lstd_system(
        mdp,
        batch,
        policy,
        params.gamma,
        params.lambda,
        |sample, phi_t| {
            let psi = mdp.psi(&sample.state);
            expect_dim("psi", p, psi.len())?;
            b += phi_t * psi.transpose();
            Ok(())
        },
    )?;

    let xi = super::solve_checked(a, &b)?;

    let mut sum = DVector::<Continous>::zeros(p);
    for _ in 0..params.num_initial_states {
        let s0 = mdp.initial_state(rng);
        let a0 = greedy_action(mdp, policy, &s0)?;
        let phi_0 = mdp.phi(&s0, a0);
        expect_dim("phi", k, phi_0.len())?;
        sum += xi.tr_mul(&phi_0);
    }

    Ok(FeatureExpectation::new(
        sum / params.num_initial_states as Continous,
    ))
}
