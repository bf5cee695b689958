//! Inverted pendulum on a cart, the classic LSPI benchmark: three noisy
//! bang-bang controls, Gaussian radial basis features over (position, speed).

use crate::mdps::{Continous, Discrete, MdpAdapter, State, StepInfo};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const ACTIONS: [Discrete; 3] = [0, 1, 2];
const CONTROLS: [Continous; 3] = [-50.0, 0.0, 50.0];
const NOISE: Continous = 10.0;

const GRAVITY: Continous = 9.8;
const POLE_MASS: Continous = 2.0;
const CART_MASS: Continous = 8.0;
const POLE_LENGTH: Continous = 0.5;
const TIME_STEP: Continous = 0.1;

const POSITION_CENTERS: [Continous; 3] = [-FRAC_PI_4, 0.0, FRAC_PI_4];
const SPEED_CENTERS: [Continous; 3] = [-1.0, 0.0, 1.0];

pub struct InvertedPendulum {
    /// Initial (position, speed) are drawn uniformly from +/- this.
    initial_range: Continous,
}

impl InvertedPendulum {
    pub fn new() -> Self {
        Self::with_initial_range(0.1)
    }

    pub fn with_initial_range(initial_range: Continous) -> Self {
        assert!(initial_range > 0.0, "initial range must be positive");
        Self { initial_range }
    }
}

impl Default for InvertedPendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl MdpAdapter for InvertedPendulum {
    fn state_dim(&self) -> usize {
        2
    }

    fn actions(&self) -> &[Discrete] {
        &ACTIONS
    }

    fn phi_dim(&self) -> usize {
        ACTIONS.len() * self.psi_dim()
    }

    fn psi_dim(&self) -> usize {
        1 + POSITION_CENTERS.len() * SPEED_CENTERS.len()
    }

    /// Bias plus nine Gaussians on a 3x3 grid of (position, speed) centers.
    fn psi(&self, s: &[Continous]) -> DVector<Continous> {
        let (position, speed) = (s[0], s[1]);
        let mut v = DVector::zeros(self.psi_dim());
        v[0] = 1.0;
        let mut index = 1;
        for ci in POSITION_CENTERS {
            for cj in SPEED_CENTERS {
                v[index] =
                    (-((position - ci).powi(2) + (speed - cj).powi(2)) / 2.0).exp();
                index += 1;
            }
        }
        v
    }

    /// One block of `psi` per action.
    fn phi(&self, s: &[Continous], a: Discrete) -> DVector<Continous> {
        let p = self.psi_dim();
        let mut v = DVector::zeros(self.phi_dim());
        v.rows_mut(a as usize * p, p).copy_from(&self.psi(s));
        v
    }

    fn simulate(&self, s: &[Continous], a: Discrete, rng: &mut StdRng) -> StepInfo {
        let (position, speed) = (s[0], s[1]);
        let control = CONTROLS[a as usize] + rng.gen_range(-NOISE..NOISE);

        let alpha = 1.0 / (POLE_MASS + CART_MASS);
        let acceleration = (GRAVITY * position.sin()
            - alpha * POLE_MASS * POLE_LENGTH * speed.powi(2) * (2.0 * position).sin() / 2.0
            - alpha * position.cos() * control)
            / (4.0 * POLE_LENGTH / 3.0 - alpha * POLE_MASS * POLE_LENGTH * position.cos().powi(2));

        let next_position = position + speed * TIME_STEP;
        let next_speed = speed + acceleration * TIME_STEP;

        let done = next_position.abs() > FRAC_PI_2;
        StepInfo {
            next_state: vec![next_position, next_speed],
            reward: if done { -1.0 } else { 0.0 },
            done,
        }
    }

    fn initial_state(&self, rng: &mut StdRng) -> State {
        let r = self.initial_range;
        vec![rng.gen_range(-r..r), rng.gen_range(-r..r)]
    }
}
