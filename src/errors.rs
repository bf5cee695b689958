use thiserror::Error;

/// Failures surfaced by the solvers and the projection loop.
///
/// Iteration caps running out are not in here: hitting a budget is a
/// degraded result, reported through the `converged` flag on the outcome
/// structs, while every variant below aborts the computation that raised it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("linear system of size {size} is singular within working precision")]
    SingularSystem { size: usize },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("malformed sample row {row}: {reason}")]
    MalformedSample { row: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
