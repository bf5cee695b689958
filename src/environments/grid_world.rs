//! Grid world with one-hot feature bases: K = width * height * 4 state-action
//! features, P = width * height state features.

use crate::mdps::{Continous, Discrete, MdpAdapter, State, StepInfo};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

const ACTIONS: [Discrete; 4] = [0, 1, 2, 3]; // east, west, north, south

pub struct GridWorld {
    width: usize,
    height: usize,
    /// Probability that a step executes a uniformly random action instead of
    /// the chosen one.
    slip: Continous,
}

impl GridWorld {
    pub fn new(width: usize, height: usize, slip: Continous) -> Self {
        assert!(width > 0 && height > 0, "degenerate {width}x{height} grid");
        assert!(
            (0.0..=1.0).contains(&slip),
            "slip probability {slip} outside [0, 1]"
        );
        Self {
            width,
            height,
            slip,
        }
    }

    /// Cells are 1-based, (1, 1) bottom-left, goal at (width, height).
    fn cell_index(&self, s: &[Continous]) -> usize {
        let x = s[0] as usize;
        let y = s[1] as usize;
        assert!(
            (1..=self.width).contains(&x) && (1..=self.height).contains(&y),
            "state ({x}, {y}) outside the {}x{} grid",
            self.width,
            self.height
        );
        (y - 1) * self.width + (x - 1)
    }

    fn at_goal(&self, s: &[Continous]) -> bool {
        s[0] as usize == self.width && s[1] as usize == self.height
    }
}

impl MdpAdapter for GridWorld {
    fn state_dim(&self) -> usize {
        2
    }

    fn actions(&self) -> &[Discrete] {
        &ACTIONS
    }

    fn phi_dim(&self) -> usize {
        self.width * self.height * ACTIONS.len()
    }

    fn psi_dim(&self) -> usize {
        self.width * self.height
    }

    fn phi(&self, s: &[Continous], a: Discrete) -> DVector<Continous> {
        let mut v = DVector::zeros(self.phi_dim());
        v[self.cell_index(s) * ACTIONS.len() + a as usize] = 1.0;
        v
    }

    fn psi(&self, s: &[Continous]) -> DVector<Continous> {
        let mut v = DVector::zeros(self.psi_dim());
        v[self.cell_index(s)] = 1.0;
        v
    }

    fn simulate(&self, s: &[Continous], a: Discrete, rng: &mut StdRng) -> StepInfo {
        if self.at_goal(s) {
            return StepInfo {
                next_state: s.to_vec(),
                reward: 0.0,
                done: true,
            };
        }

        let a = if self.slip > 0.0 && rng.gen::<Continous>() < self.slip {
            *ACTIONS.choose(rng).unwrap()
        } else {
            a
        };

        let (mut x, mut y) = (s[0] as i64, s[1] as i64);
        match a {
            0 => x += 1,
            1 => x -= 1,
            2 => y += 1,
            3 => y -= 1,
            _ => panic!("action {a} is not a grid move"),
        }
        x = x.clamp(1, self.width as i64);
        y = y.clamp(1, self.height as i64);

        let next_state = vec![x as Continous, y as Continous];
        let done = self.at_goal(&next_state);
        StepInfo {
            next_state,
            reward: if done { 1.0 } else { 0.0 },
            done,
        }
    }

    fn initial_state(&self, _rng: &mut StdRng) -> State {
        vec![1.0, 1.0]
    }
}
