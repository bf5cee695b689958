//! Statistical acceptance of candidate policies against the expert.
//!
//! The criterion owns the running best-so-far record; callers get a fresh
//! record back per evaluation and can ask for the best at any time.

use crate::errors::Result;
use crate::mdps::{expect_dim, Continous, FeatureExpectation};
use itertools::izip;
use serde::Serialize;

/// Paired t statistic and mean over a series of differences. The statistic
/// is 0 for (near-)constant differences rather than blowing up to infinity.
pub fn paired_t(diffs: &[Continous]) -> (Continous, Continous) {
    let n = diffs.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = diffs.iter().sum::<Continous>() / n as Continous;
    if n < 2 {
        return (0.0, mean);
    }
    let var = diffs.iter().map(|d| (d - mean).powi(2)).sum::<Continous>() / (n - 1) as Continous;
    let sd = var.sqrt();
    if sd <= 1e-12 {
        (0.0, mean)
    } else {
        (mean / (sd / (n as Continous).sqrt()), mean)
    }
}

/// Statistic bundle for one candidate. `true_error` is only present when the
/// ground-truth reward was observable; `converged` is false when any solve
/// feeding this candidate ran out of iteration budget, so a match can be
/// told apart from a budget-exhausted approximation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceRecord {
    pub iteration: usize,
    pub t_stat: Continous,
    pub est_error: Continous,
    pub true_error: Option<Continous>,
    pub fe_distance: Continous,
    pub converged: bool,
}

/// One candidate's observable behavior, as far as the configured estimator
/// could measure it. The value and return series are expert/candidate pairs;
/// series of unequal length are paired up to the shorter one.
#[derive(Debug, Clone, Copy)]
pub struct CandidateEval<'a> {
    pub iteration: usize,
    pub mu: &'a FeatureExpectation,
    /// Per-rollout values under the current reward hypothesis.
    pub values: Option<(&'a [Continous], &'a [Continous])>,
    /// Per-rollout returns under the ground-truth reward.
    pub returns: Option<(&'a [Continous], &'a [Continous])>,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct AcceptanceCriterion {
    expert_mu: FeatureExpectation,
    best: Option<AcceptanceRecord>,
}

impl AcceptanceCriterion {
    pub fn new(expert_mu: FeatureExpectation) -> Self {
        Self {
            expert_mu,
            best: None,
        }
    }

    /// Scores a candidate and updates the running best. A candidate becomes
    /// the new best iff its feature-expectation distance is strictly smaller
    /// than the incumbent's, so ties keep the earlier iteration.
    pub fn evaluate(&mut self, candidate: &CandidateEval) -> Result<(bool, AcceptanceRecord)> {
        expect_dim(
            "feature expectation",
            self.expert_mu.dim(),
            candidate.mu.dim(),
        )?;

        let fe_distance = self.expert_mu.distance(candidate.mu);
        let diffs: Vec<Continous> = match candidate.values {
            Some((expert, cand)) => izip!(expert, cand).map(|(e, c)| e - c).collect(),
            None => izip!(
                self.expert_mu.as_vector().iter(),
                candidate.mu.as_vector().iter()
            )
            .map(|(e, c)| e - c)
            .collect(),
        };
        let (t_stat, mean_diff) = paired_t(&diffs);
        let true_error = candidate
            .returns
            .map(|(expert, cand)| (mean(expert) - mean(cand)).abs());

        let record = AcceptanceRecord {
            iteration: candidate.iteration,
            t_stat,
            est_error: mean_diff.abs(),
            true_error,
            fe_distance,
            converged: candidate.converged,
        };

        let is_best = match &self.best {
            None => true,
            Some(incumbent) => record.fe_distance < incumbent.fe_distance,
        };
        if is_best {
            self.best = Some(record.clone());
        }
        Ok((is_best, record))
    }

    pub fn best(&self) -> Option<&AcceptanceRecord> {
        self.best.as_ref()
    }
}

fn mean(xs: &[Continous]) -> Continous {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<Continous>() / xs.len() as Continous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use nalgebra::DVector;

    fn fe(components: &[Continous]) -> FeatureExpectation {
        FeatureExpectation::new(DVector::from_column_slice(components))
    }

    #[test]
    fn paired_t_on_known_numbers() {
        let (t, mean) = paired_t(&[1.0, 2.0, 3.0]);
        assert_float_eq!(mean, 2.0, abs <= 1e-12);
        assert_float_eq!(t, 2.0 * 3.0_f64.sqrt(), abs <= 1e-12);
    }

    #[test]
    fn constant_differences_yield_a_zero_statistic() {
        let (t, mean) = paired_t(&[0.5, 0.5, 0.5]);
        assert_float_eq!(t, 0.0, abs <= 1e-12);
        assert_float_eq!(mean, 0.5, abs <= 1e-12);
    }

    #[test]
    fn best_is_replaced_only_on_strict_improvement() {
        let expert = fe(&[1.0, 0.0]);
        let mut criterion = AcceptanceCriterion::new(expert);

        let further = fe(&[0.0, 0.0]);
        let (is_best, _) = criterion
            .evaluate(&CandidateEval {
                iteration: 1,
                mu: &further,
                values: None,
                returns: None,
                converged: true,
            })
            .unwrap();
        assert!(is_best);

        // Same distance, later iteration: the incumbent stays.
        let mirrored = fe(&[2.0, 0.0]);
        let (is_best, _) = criterion
            .evaluate(&CandidateEval {
                iteration: 2,
                mu: &mirrored,
                values: None,
                returns: None,
                converged: true,
            })
            .unwrap();
        assert!(!is_best);
        assert_eq!(criterion.best().unwrap().iteration, 1);

        let closer = fe(&[0.5, 0.0]);
        let (is_best, record) = criterion
            .evaluate(&CandidateEval {
                iteration: 3,
                mu: &closer,
                values: None,
                returns: None,
                converged: false,
            })
            .unwrap();
        assert!(is_best);
        assert_float_eq!(record.fe_distance, 0.5, abs <= 1e-12);
        assert!(!criterion.best().unwrap().converged);
    }

    #[test]
    fn value_series_take_precedence_over_component_differences() {
        let expert = fe(&[1.0, 0.0]);
        let mut criterion = AcceptanceCriterion::new(expert);
        let mu = fe(&[1.0, 0.0]);

        let expert_values = [10.0, 10.0, 10.0];
        let candidate_values = [9.0, 9.0, 9.0];
        let (_, record) = criterion
            .evaluate(&CandidateEval {
                iteration: 1,
                mu: &mu,
                values: Some((&expert_values, &candidate_values)),
                returns: Some((&expert_values, &candidate_values)),
                converged: true,
            })
            .unwrap();

        assert_float_eq!(record.est_error, 1.0, abs <= 1e-12);
        assert_float_eq!(record.true_error.unwrap(), 1.0, abs <= 1e-12);
        assert_float_eq!(record.fe_distance, 0.0, abs <= 1e-12);
    }

    #[test]
    fn mismatched_feature_expectations_are_rejected() {
        let mut criterion = AcceptanceCriterion::new(fe(&[1.0, 0.0]));
        let short = fe(&[1.0]);
        let err = criterion
            .evaluate(&CandidateEval {
                iteration: 1,
                mu: &short,
                values: None,
                returns: None,
                converged: true,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::errors::Error::DimensionMismatch { .. }
        ));
    }
}
