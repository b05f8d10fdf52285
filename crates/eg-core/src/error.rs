use thiserror::Error;

pub type EgResult<T> = Result<T, EgError>;

/// Rejected scalar inputs: reference scales, time steps, tolerances.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EgError {
    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NotPositive { what: &'static str, value: f64 },

    #[error("{what} must be non-zero")]
    Zero { what: &'static str },
}
