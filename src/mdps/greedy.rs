use super::{expect_dim, Continous, Discrete, MdpAdapter, PolicyWeights};
use crate::errors::{Error, Result};

/// Q-value of (s, a) under a linear value function.
pub fn q_value(
    mdp: &dyn MdpAdapter,
    omega: &PolicyWeights,
    s: &[Continous],
    a: Discrete,
) -> Result<Continous> {
    let phi = mdp.phi(s, a);
    expect_dim("phi", mdp.phi_dim(), phi.len())?;
    Ok(omega.as_vector().dot(&phi))
}

/// Action maximizing the Q-value at `s`. Ties go to the action enumerated
/// first, so the policy is deterministic for a given weight vector.
pub fn greedy_action(
    mdp: &dyn MdpAdapter,
    omega: &PolicyWeights,
    s: &[Continous],
) -> Result<Discrete> {
    expect_dim("policy weights", mdp.phi_dim(), omega.dim())?;
    let actions = mdp.actions();
    let (&first, rest) = actions
        .split_first()
        .ok_or(Error::EmptyInput("action set"))?;

    let mut best = first;
    let mut best_q = q_value(mdp, omega, s, first)?;
    for &a in rest {
        let q = q_value(mdp, omega, s, a)?;
        if q > best_q {
            best = a;
            best_q = q;
        }
    }
    Ok(best)
}
