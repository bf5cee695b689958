pub mod lspi;
pub mod lstd_mu;
pub mod monte_carlo;

use super::greedy::greedy_action;
use super::samples::{SampleBatch, TransitionSample};
use super::{expect_dim, Continous, MdpAdapter, PolicyWeights};
use crate::errors::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Accumulates the LSTD system matrix `sum phi (phi - gamma phi')^T` over a
/// batch, with `phi'` the feature vector of the greedy successor action under
/// `policy` (zero for terminal samples), then adds the ridge term
/// `lambda * I`. The per-sample right-hand-side contribution is delegated to
/// `accumulate_rhs`, which is what differs between the LSTD-Q and LSTD-mu
/// fits.
///
/// Summation runs in batch order. Reordering perturbs low-order floating
/// point bits, which can flip strict convergence-threshold comparisons
/// downstream; callers must not assume order independence.
pub(crate) fn lstd_system<R>(
    mdp: &dyn MdpAdapter,
    batch: &SampleBatch,
    policy: &PolicyWeights,
    gamma: Continous,
    lambda: Continous,
    mut accumulate_rhs: R,
) -> Result<DMatrix<Continous>>
where
    R: FnMut(&TransitionSample, &DVector<Continous>) -> Result<()>,
{
    let k = mdp.phi_dim();
    expect_dim("policy weights", k, policy.dim())?;
    expect_dim("batch state", mdp.state_dim(), batch.state_dim())?;

    let mut a = DMatrix::<Continous>::zeros(k, k);
    for sample in batch.iter() {
        let phi_t = mdp.phi(&sample.state, sample.action);
        expect_dim("phi", k, phi_t.len())?;

        let backup = if sample.done {
            DVector::zeros(k)
        } else {
            let a_dash = greedy_action(mdp, policy, &sample.next_state)?;
            let phi_dash = mdp.phi(&sample.next_state, a_dash);
            expect_dim("phi", k, phi_dash.len())?;
            phi_dash
        };

        a += &phi_t * (&phi_t - backup * gamma).transpose();
        accumulate_rhs(sample, &phi_t)?;
    }

    for i in 0..k {
        a[(i, i)] += lambda;
    }
    Ok(a)
}

/// LU-solves `a x = b`, treating a singular factorization or a non-finite
/// solution as the same unrecoverable condition.
pub(crate) fn solve_checked(
    a: DMatrix<Continous>,
    b: &DMatrix<Continous>,
) -> Result<DMatrix<Continous>> {
    let size = a.nrows();
    let x = a.lu().solve(b).ok_or(Error::SingularSystem { size })?;
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(Error::SingularSystem { size })
    }
}
