//! Apprenticeship learning via inverse reinforcement learning.
//!
//! A batch of demonstrated transitions plus a domain's feature maps go in;
//! a linear reward weighting whose greedy policy imitates the expert comes
//! out. The pieces: LSPI for solving a reward hypothesis, Monte-Carlo and
//! LSTD-mu estimators for a policy's discounted feature expectation, and the
//! Abbeel-Ng projection loop tying them together with a statistical
//! acceptance criterion.

pub mod environments;
pub mod errors;
pub mod irl;
pub mod mdps;

pub use environments::{GridWorld, InvertedPendulum};
pub use errors::{Error, Result};
pub use irl::criteria::{paired_t, AcceptanceCriterion, AcceptanceRecord, CandidateEval};
pub use irl::projection::{
    AnirlOutcome, AnirlParams, ExpertReference, FeatureExpectationEstimator, IterationReport,
    LstdMuEstimator, MonteCarloEstimator, PolicyEvaluation, ProjectionLoop,
};
pub use mdps::greedy::{greedy_action, q_value};
pub use mdps::samples::{SampleBatch, TransitionSample};
pub use mdps::solvers::lspi::{lspi, lstdq, LspiOutcome, LspiParams, LstdqParams, RewardSource};
pub use mdps::solvers::lstd_mu::{estimate_fe_lstd, LstdMuParams};
pub use mdps::solvers::monte_carlo::{estimate_fe_mc, McParams, McRollouts};
pub use mdps::{
    Continous, Discrete, FeatureExpectation, MdpAdapter, PolicyWeights, RewardWeights, State,
    StepInfo,
};
