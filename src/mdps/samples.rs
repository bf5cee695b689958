use super::{expect_dim, Continous, Discrete, MdpAdapter, State};
use crate::errors::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One observed transition (s, a, r, s', done).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionSample {
    pub state: State,
    pub action: Discrete,
    pub reward: Continous,
    pub next_state: State,
    pub done: bool,
}

/// A fixed batch of transition samples. Non-empty and dimension-consistent
/// by construction, immutable thereafter. Iteration order is the load order;
/// the solvers accumulate in that order.
#[derive(Clone, Debug)]
pub struct SampleBatch {
    samples: Vec<TransitionSample>,
    state_dim: usize,
}

impl SampleBatch {
    pub fn new(samples: Vec<TransitionSample>) -> Result<Self> {
        let state_dim = samples
            .first()
            .ok_or(Error::EmptyInput("sample batch"))?
            .state
            .len();
        for sample in &samples {
            expect_dim("sample state", state_dim, sample.state.len())?;
            expect_dim("sample next state", state_dim, sample.next_state.len())?;
        }
        Ok(Self { samples, state_dim })
    }

    /// Parses a whitespace-separated table, one transition per row, columns
    /// `s... a r s'... done` with `done` being 0 or 1. Malformed rows fail
    /// the whole load.
    pub fn parse(text: &str, state_dim: usize) -> Result<Self> {
        let width = 2 * state_dim + 3;
        let mut samples = Vec::new();
        for (row, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = line
                .split_whitespace()
                .map(|f| {
                    f.parse::<Continous>().map_err(|e| Error::MalformedSample {
                        row,
                        reason: format!("{f:?}: {e}"),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if fields.len() != width {
                return Err(Error::MalformedSample {
                    row,
                    reason: format!("expected {width} columns, got {}", fields.len()),
                });
            }

            let action = fields[state_dim];
            if action.fract() != 0.0 {
                return Err(Error::MalformedSample {
                    row,
                    reason: format!("action {action} is not an integer"),
                });
            }
            let done = match fields[width - 1] {
                f if f == 0.0 => false,
                f if f == 1.0 => true,
                f => {
                    return Err(Error::MalformedSample {
                        row,
                        reason: format!("terminal flag {f} is not 0 or 1"),
                    })
                }
            };

            samples.push(TransitionSample {
                state: fields[..state_dim].to_vec(),
                action: action as Discrete,
                reward: fields[state_dim + 1],
                next_state: fields[state_dim + 2..width - 1].to_vec(),
                done,
            });
        }
        Self::new(samples)
    }

    /// Draws `num_samples` transitions by walking the simulator under a
    /// uniformly random policy, resetting to an initial state whenever an
    /// episode ends.
    pub fn random_walk(
        mdp: &dyn MdpAdapter,
        num_samples: usize,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if num_samples == 0 {
            return Err(Error::EmptyInput("sample budget"));
        }

        let mut samples = Vec::with_capacity(num_samples);
        let mut state = mdp.initial_state(rng);
        for _ in 0..num_samples {
            let &action = mdp
                .actions()
                .choose(rng)
                .ok_or(Error::EmptyInput("action set"))?;
            let step = mdp.simulate(&state, action, rng);
            samples.push(TransitionSample {
                state: state.clone(),
                action,
                reward: step.reward,
                next_state: step.next_state.clone(),
                done: step.done,
            });
            state = if step.done {
                mdp.initial_state(rng)
            } else {
                step.next_state
            };
        }
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn samples(&self) -> &[TransitionSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransitionSample> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_the_original_column_order() {
        let batch = SampleBatch::parse("1 1 2 0.0 2 1 0\n2 1 3 1.0 2 2 1\n", 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.state_dim(), 2);

        let s = &batch.samples()[1];
        assert_eq!(s.state, vec![2.0, 1.0]);
        assert_eq!(s.action, 3);
        assert_eq!(s.reward, 1.0);
        assert_eq!(s.next_state, vec![2.0, 2.0]);
        assert!(s.done);
    }

    #[test]
    fn skips_blank_lines() {
        let batch = SampleBatch::parse("\n1 1 0 0.0 2 1 0\n\n", 2).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[rstest]
    #[case::short_row("1 1 0 0.0 2 1\n")]
    #[case::long_row("1 1 0 0.0 2 1 0 7\n")]
    #[case::not_a_number("1 x 0 0.0 2 1 0\n")]
    #[case::fractional_action("1 1 0.5 0.0 2 1 0\n")]
    #[case::bad_terminal_flag("1 1 0 0.0 2 1 2\n")]
    fn malformed_rows_fail_the_load(#[case] text: &str) {
        let err = SampleBatch::parse(text, 2).unwrap_err();
        assert!(matches!(err, Error::MalformedSample { row: 0, .. }));
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = SampleBatch::parse("", 2).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn inconsistent_state_dims_are_rejected() {
        let samples = vec![
            TransitionSample {
                state: vec![0.0],
                action: 0,
                reward: 0.0,
                next_state: vec![1.0],
                done: false,
            },
            TransitionSample {
                state: vec![0.0, 1.0],
                action: 0,
                reward: 0.0,
                next_state: vec![1.0],
                done: false,
            },
        ];
        let err = SampleBatch::new(samples).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
