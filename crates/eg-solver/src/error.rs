//! Error types for minimizer operations.

use eg_core::error::EgError;
use thiserror::Error;

/// Errors that can occur during minimization.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Objective evaluation failed: {what}")]
    Evaluation { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Core error: {0}")]
    Core(#[from] EgError),
}

pub type SolverResult<T> = Result<T, SolverError>;
