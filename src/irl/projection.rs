//! Apprenticeship learning by projection: alternate LSPI under a reward
//! hypothesis, feature-expectation estimation and an orthogonal projection
//! toward the expert's feature expectation.
//!
//! Ref: Abbeel & Ng 2004, "Apprenticeship learning via inverse reinforcement
//! learning", https://ai.stanford.edu/~ang/papers/icml04-apprentice.pdf

use super::criteria::{AcceptanceCriterion, AcceptanceRecord, CandidateEval};
use crate::errors::Result;
use crate::mdps::samples::SampleBatch;
use crate::mdps::solvers::lspi::{lspi, LspiParams, RewardSource};
use crate::mdps::solvers::lstd_mu::{estimate_fe_lstd, LstdMuParams};
use crate::mdps::solvers::monte_carlo::{estimate_fe_mc, McParams, McRollouts};
use crate::mdps::{
    expect_dim, Continous, FeatureExpectation, MdpAdapter, PolicyWeights, RewardWeights,
};
use nalgebra::DVector;
use rand::rngs::StdRng;
use serde::Serialize;
use std::rc::Rc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct AnirlParams {
    /// Outer loop stops once the margin to the expert drops below this.
    pub epsilon: Continous,
    pub max_iterations: usize,
    pub lspi: LspiParams,
}

impl Default for AnirlParams {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            max_iterations: 40,
            lspi: LspiParams::default(),
        }
    }
}

/// What an estimator could observe about one candidate policy.
#[derive(Debug, Clone)]
pub struct PolicyEvaluation {
    pub mu: FeatureExpectation,
    /// Per-rollout feature counts, when the estimator rolled trajectories.
    pub per_rollout: Option<Vec<DVector<Continous>>>,
    /// Per-rollout returns under the simulator's own reward.
    pub returns: Option<Vec<Continous>>,
    pub samples_used: usize,
    pub converged: bool,
}

/// Strategy supplying candidate feature expectations to the loop: Monte
/// Carlo needs the simulator, LSTD-mu only the batch.
pub trait FeatureExpectationEstimator {
    fn estimate(
        &self,
        mdp: &dyn MdpAdapter,
        batch: &SampleBatch,
        policy: &PolicyWeights,
        rng: &mut StdRng,
    ) -> Result<PolicyEvaluation>;
}

pub struct MonteCarloEstimator {
    pub params: McParams,
}

impl FeatureExpectationEstimator for MonteCarloEstimator {
    fn estimate(
        &self,
        mdp: &dyn MdpAdapter,
        _batch: &SampleBatch,
        policy: &PolicyWeights,
        rng: &mut StdRng,
    ) -> Result<PolicyEvaluation> {
        let rollouts = estimate_fe_mc(mdp, policy, &self.params, rng)?;
        Ok(PolicyEvaluation {
            mu: rollouts.mu,
            samples_used: rollouts.batch.len(),
            per_rollout: Some(rollouts.per_rollout),
            returns: Some(rollouts.returns),
            converged: true,
        })
    }
}

pub struct LstdMuEstimator {
    pub params: LstdMuParams,
}

impl FeatureExpectationEstimator for LstdMuEstimator {
    fn estimate(
        &self,
        mdp: &dyn MdpAdapter,
        batch: &SampleBatch,
        policy: &PolicyWeights,
        rng: &mut StdRng,
    ) -> Result<PolicyEvaluation> {
        let mu = estimate_fe_lstd(mdp, batch, policy, &self.params, rng)?;
        Ok(PolicyEvaluation {
            mu,
            per_rollout: None,
            returns: None,
            samples_used: batch.len(),
            converged: true,
        })
    }
}

/// The expert's side of every comparison the loop makes.
#[derive(Debug, Clone)]
pub struct ExpertReference {
    pub mu: FeatureExpectation,
    pub per_rollout: Option<Vec<DVector<Continous>>>,
    pub returns: Option<Vec<Continous>>,
}

impl ExpertReference {
    pub fn new(mu: FeatureExpectation) -> Self {
        Self {
            mu,
            per_rollout: None,
            returns: None,
        }
    }
}

impl From<&McRollouts> for ExpertReference {
    fn from(rollouts: &McRollouts) -> Self {
        Self {
            mu: rollouts.mu.clone(),
            per_rollout: Some(rollouts.per_rollout.clone()),
            returns: Some(rollouts.returns.clone()),
        }
    }
}

/// Emitted after every outer iteration; consumers decide how to format it.
#[derive(Debug, Clone, Serialize)]
pub struct IterationReport {
    pub iteration: usize,
    pub sample_count: usize,
    pub margin: Continous,
    pub best: AcceptanceRecord,
}

#[derive(Debug, Clone)]
pub struct AnirlOutcome {
    /// Reward weighting of the best-recorded candidate, not necessarily the
    /// last iterate.
    pub reward_weights: RewardWeights,
    /// LSPI weights of that same candidate.
    pub policy_weights: PolicyWeights,
    /// Margin after each outer iteration; non-increasing from the second
    /// entry on by construction of the projection.
    pub margins: Vec<Continous>,
    pub reports: Vec<IterationReport>,
    pub best: AcceptanceRecord,
    pub converged: bool,
}

pub struct ProjectionLoop {
    mdp: Rc<dyn MdpAdapter>,
    estimator: Rc<dyn FeatureExpectationEstimator>,
    params: AnirlParams,
}

impl ProjectionLoop {
    pub fn new(
        mdp: Rc<dyn MdpAdapter>,
        estimator: Rc<dyn FeatureExpectationEstimator>,
        params: AnirlParams,
    ) -> Self {
        Self {
            mdp,
            estimator,
            params,
        }
    }

    /// Runs the projection loop against the expert reference, fitting every
    /// candidate policy on `batch`. `initial_reward` seeds the first
    /// hypothesis; a random unit vector is drawn when absent.
    pub fn run(
        &self,
        expert: &ExpertReference,
        batch: &SampleBatch,
        initial_reward: Option<RewardWeights>,
        rng: &mut StdRng,
    ) -> Result<AnirlOutcome> {
        let mdp = self.mdp.as_ref();
        let p = mdp.psi_dim();
        expect_dim("expert feature expectation", p, expert.mu.dim())?;

        let mut theta = match initial_reward {
            Some(theta) => {
                expect_dim("initial reward weights", p, theta.dim())?;
                theta
            }
            None => RewardWeights::random_unit(p, rng)?,
        };

        let omega_0 = PolicyWeights::zeros(mdp.phi_dim());
        let mut criterion = AcceptanceCriterion::new(expert.mu.clone());
        let mut margins = Vec::new();
        let mut reports = Vec::new();

        // First candidate; its evaluation seeds the running estimate.
        let solved = lspi(
            mdp,
            batch,
            &omega_0,
            &RewardSource::Hypothesis(&theta),
            &self.params.lspi,
        )?;
        let eval = self.estimator.estimate(mdp, batch, &solved.weights, rng)?;
        let mut mu_bar = eval.mu.as_vector().clone();
        let mut best_payload = (theta.clone(), solved.weights.clone());

        let mut iteration = 1;
        let (is_best, _) = self.score(&mut criterion, expert, &theta, &solved, &eval, iteration)?;
        debug_assert!(is_best);

        let mut margin = (expert.mu.as_vector() - &mu_bar).norm();
        margins.push(margin);
        self.report(&mut reports, &criterion, batch, iteration, margin);

        while margin > self.params.epsilon && iteration < self.params.max_iterations {
            iteration += 1;

            // New hypothesis: the direction separating the expert from the
            // running estimate.
            theta = RewardWeights::from_direction(expert.mu.as_vector() - &mu_bar)?;
            let solved = lspi(
                mdp,
                batch,
                &omega_0,
                &RewardSource::Hypothesis(&theta),
                &self.params.lspi,
            )?;
            let eval = self.estimator.estimate(mdp, batch, &solved.weights, rng)?;

            // Orthogonal projection of the running estimate onto the segment
            // toward the new candidate, clamped so the margin cannot grow.
            let direction = eval.mu.as_vector() - &mu_bar;
            let denom = direction.dot(&direction);
            if denom > 0.0 {
                let coef = direction.dot(&(expert.mu.as_vector() - &mu_bar)) / denom;
                mu_bar += direction * coef.clamp(0.0, 1.0);
            }
            margin = (expert.mu.as_vector() - &mu_bar).norm();
            margins.push(margin);

            let (is_best, _) =
                self.score(&mut criterion, expert, &theta, &solved, &eval, iteration)?;
            if is_best {
                best_payload = (theta.clone(), solved.weights.clone());
            }
            self.report(&mut reports, &criterion, batch, iteration, margin);
        }

        let best = criterion
            .best()
            .cloned()
            .expect("at least one candidate was evaluated");
        let (reward_weights, policy_weights) = best_payload;
        Ok(AnirlOutcome {
            reward_weights,
            policy_weights,
            margins,
            reports,
            best,
            converged: margin <= self.params.epsilon,
        })
    }

    fn score(
        &self,
        criterion: &mut AcceptanceCriterion,
        expert: &ExpertReference,
        theta: &RewardWeights,
        solved: &crate::mdps::solvers::lspi::LspiOutcome,
        eval: &PolicyEvaluation,
        iteration: usize,
    ) -> Result<(bool, AcceptanceRecord)> {
        // Rollout feature counts reduce to scalar values under the current
        // hypothesis; without rollouts the criterion falls back to pairing
        // feature-expectation components.
        let values = match (&expert.per_rollout, &eval.per_rollout) {
            (Some(expert_mus), Some(candidate_mus)) => Some((
                values_under(theta, expert_mus),
                values_under(theta, candidate_mus),
            )),
            _ => None,
        };
        let returns = match (&expert.returns, &eval.returns) {
            (Some(e), Some(c)) => Some((e.as_slice(), c.as_slice())),
            _ => None,
        };

        criterion.evaluate(&CandidateEval {
            iteration,
            mu: &eval.mu,
            values: values
                .as_ref()
                .map(|(e, c)| (e.as_slice(), c.as_slice())),
            returns,
            converged: solved.converged && eval.converged,
        })
    }

    fn report(
        &self,
        reports: &mut Vec<IterationReport>,
        criterion: &AcceptanceCriterion,
        batch: &SampleBatch,
        iteration: usize,
        margin: Continous,
    ) {
        let best = criterion
            .best()
            .cloned()
            .expect("scored before reporting");
        info!(
            iteration,
            margin,
            best_iteration = best.iteration,
            fe_distance = best.fe_distance,
            "anirl iteration"
        );
        reports.push(IterationReport {
            iteration,
            sample_count: batch.len(),
            margin,
            best,
        });
    }
}

fn values_under(theta: &RewardWeights, rollout_mus: &[DVector<Continous>]) -> Vec<Continous> {
    rollout_mus
        .iter()
        .map(|mu| theta.as_vector().dot(mu))
        .collect()
}
