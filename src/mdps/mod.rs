pub mod greedy;
pub mod samples;
pub mod solvers;

use crate::errors::{Error, Result};
use nalgebra::DVector;
use rand::rngs::StdRng;

pub type Discrete = i32;
pub type Continous = f64;

/// A state is a short vector of components, e.g. `(x, y)` or `(position, speed)`.
pub type State = Vec<Continous>;

#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub next_state: State,
    pub reward: Continous,
    pub done: bool,
}

/// Domain side of a Markov Decision Process: simulator, initial-state
/// distribution and the two feature bases.
///
/// `phi` spans state-action space (dimension K, the value-function basis),
/// `psi` spans state space (dimension P, the reward basis). Everything
/// stochastic draws from the caller's `StdRng` so runs are reproducible
/// from a seed.
pub trait MdpAdapter {
    fn state_dim(&self) -> usize;

    fn actions(&self) -> &[Discrete];

    /// K = dim(phi).
    fn phi_dim(&self) -> usize;

    /// P = dim(psi).
    fn psi_dim(&self) -> usize;

    fn phi(&self, s: &[Continous], a: Discrete) -> DVector<Continous>;

    fn psi(&self, s: &[Continous]) -> DVector<Continous>;

    fn simulate(&self, s: &[Continous], a: Discrete, rng: &mut StdRng) -> StepInfo;

    fn initial_state(&self, rng: &mut StdRng) -> State;
}

/// Linear value-function coefficients, length K. The greedy policy w.r.t.
/// these weights is the policy they stand for; it is never tabulated.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyWeights(DVector<Continous>);

impl PolicyWeights {
    pub fn new(w: DVector<Continous>) -> Self {
        Self(w)
    }

    pub fn zeros(k: usize) -> Self {
        Self(DVector::zeros(k))
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_vector(&self) -> &DVector<Continous> {
        &self.0
    }
}

/// Linear reward coefficients, length P: r(s) = theta . psi(s).
///
/// Same numeric shape as `PolicyWeights` but a different role; the two are
/// distinct types so one cannot be handed to an API expecting the other.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardWeights(DVector<Continous>);

impl RewardWeights {
    pub fn new(w: DVector<Continous>) -> Self {
        Self(w)
    }

    /// Uniformly random direction on the unit sphere (up to the box-sampling
    /// distortion the original used as well).
    pub fn random_unit(p: usize, rng: &mut StdRng) -> Result<Self> {
        use rand::Rng;

        if p == 0 {
            return Err(Error::EmptyInput("reward basis"));
        }
        loop {
            let v = DVector::from_fn(p, |_, _| rng.gen_range(-1.0..1.0));
            let norm = v.norm();
            if norm > 1e-12 {
                return Ok(Self(v / norm));
            }
        }
    }

    /// Normalized direction vector; fails on a (near-)zero direction.
    pub fn from_direction(direction: DVector<Continous>) -> Result<Self> {
        let norm = direction.norm();
        if norm <= 1e-12 {
            return Err(Error::EmptyInput("reward direction"));
        }
        Ok(Self(direction / norm))
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_vector(&self) -> &DVector<Continous> {
        &self.0
    }

    pub fn reward(&self, psi: &DVector<Continous>) -> Continous {
        self.0.dot(psi)
    }
}

/// Estimated discounted feature count `E[sum_t gamma^t psi(s_t)]` of a
/// policy, length P. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureExpectation(DVector<Continous>);

impl FeatureExpectation {
    pub fn new(mu: DVector<Continous>) -> Self {
        Self(mu)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_vector(&self) -> &DVector<Continous> {
        &self.0
    }

    pub fn distance(&self, other: &FeatureExpectation) -> Continous {
        (&self.0 - &other.0).norm()
    }
}

pub(crate) fn expect_dim(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
