//! Error types for energy terms and the composite error function.

use eg_core::EgError;
use eg_solver::SolverError;
use thiserror::Error;

/// Errors raised by term construction and evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnergyError {
    #[error("Invalid term configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Time step must be positive and finite, got {dt}")]
    InvalidTimeStep { dt: f64 },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Term '{term}' needs at least {required} slots, state has {dimension}")]
    TermDimension {
        term: String,
        required: usize,
        dimension: usize,
    },

    #[error("Core error: {0}")]
    Core(#[from] EgError),
}

pub type EnergyResult<T> = Result<T, EnergyError>;

impl From<EnergyError> for SolverError {
    fn from(e: EnergyError) -> Self {
        match e {
            EnergyError::Core(inner) => SolverError::Core(inner),
            EnergyError::InvalidConfig { .. }
            | EnergyError::InvalidTimeStep { .. }
            | EnergyError::TermDimension { .. } => SolverError::ProblemSetup {
                what: e.to_string(),
            },
            EnergyError::DimensionMismatch { .. } => SolverError::Evaluation {
                what: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EnergyError::TermDimension {
            term: "mass conservation".to_string(),
            required: 4,
            dimension: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("mass conservation"));
        assert!(msg.contains('4'));
    }

    #[test]
    fn error_conversion() {
        let solver: SolverError = EnergyError::InvalidTimeStep { dt: 0.0 }.into();
        assert!(matches!(solver, SolverError::ProblemSetup { .. }));

        let solver: SolverError = EnergyError::DimensionMismatch {
            what: "candidate state",
            expected: 3,
            actual: 2,
        }
        .into();
        assert!(matches!(solver, SolverError::Evaluation { .. }));
    }
}
