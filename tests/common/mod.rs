use anirl::*;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::Rng;

/// Two states, two actions (0 stays, 1 toggles), never terminating. The
/// reward basis is padded to K so a length-4 reward weighting addresses the
/// state-action one-hot basis directly.
#[allow(dead_code)]
pub struct TwoStateChain;

impl MdpAdapter for TwoStateChain {
    fn state_dim(&self) -> usize {
        1
    }

    fn actions(&self) -> &[Discrete] {
        &[0, 1]
    }

    fn phi_dim(&self) -> usize {
        4
    }

    fn psi_dim(&self) -> usize {
        4
    }

    fn phi(&self, s: &[Continous], a: Discrete) -> DVector<Continous> {
        let mut v = DVector::zeros(4);
        v[s[0] as usize * 2 + a as usize] = 1.0;
        v
    }

    fn psi(&self, s: &[Continous]) -> DVector<Continous> {
        let mut v = DVector::zeros(4);
        v[s[0] as usize] = 1.0;
        v
    }

    fn simulate(&self, s: &[Continous], a: Discrete, _rng: &mut StdRng) -> StepInfo {
        let next = if a == 0 { s[0] } else { 1.0 - s[0] };
        StepInfo {
            next_state: vec![next],
            reward: if s[0] == 0.0 { 1.0 } else { 0.0 },
            done: false,
        }
    }

    fn initial_state(&self, _rng: &mut StdRng) -> State {
        vec![0.0]
    }
}

/// Same chain with a two-component reward basis and slippery actions, so
/// feature-expectation estimates stay noisy and the projection loop has
/// something to grind on.
#[allow(dead_code)]
pub struct SlipperyChain {
    pub slip: Continous,
}

impl MdpAdapter for SlipperyChain {
    fn state_dim(&self) -> usize {
        1
    }

    fn actions(&self) -> &[Discrete] {
        &[0, 1]
    }

    fn phi_dim(&self) -> usize {
        4
    }

    fn psi_dim(&self) -> usize {
        2
    }

    fn phi(&self, s: &[Continous], a: Discrete) -> DVector<Continous> {
        let mut v = DVector::zeros(4);
        v[s[0] as usize * 2 + a as usize] = 1.0;
        v
    }

    fn psi(&self, s: &[Continous]) -> DVector<Continous> {
        let mut v = DVector::zeros(2);
        v[s[0] as usize] = 1.0;
        v
    }

    fn simulate(&self, s: &[Continous], a: Discrete, rng: &mut StdRng) -> StepInfo {
        let a = if rng.gen::<Continous>() < self.slip {
            1 - a
        } else {
            a
        };
        let next = if a == 0 { s[0] } else { 1.0 - s[0] };
        StepInfo {
            next_state: vec![next],
            reward: if s[0] == 0.0 { 1.0 } else { 0.0 },
            done: false,
        }
    }

    fn initial_state(&self, _rng: &mut StdRng) -> State {
        vec![0.0]
    }
}

/// Discounted feature count of holding one state for `horizon` steps.
#[allow(dead_code)]
pub fn held_state_mu(p: usize, index: usize, gamma: Continous, horizon: usize) -> DVector<Continous> {
    let mut mu = DVector::zeros(p);
    let mut discount = 1.0;
    for _ in 0..horizon {
        mu[index] += discount;
        discount *= gamma;
    }
    mu
}
