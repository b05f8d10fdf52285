//! Error types for mapper operations.

use eg_core::EgError;
use thiserror::Error;

/// Errors raised by mapper construction and state access.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid mapper configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("State too short for {what}: need {required} slots, got {actual}")]
    TooShort {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Core error: {0}")]
    Core(#[from] EgError),
}

pub type StateResult<T> = Result<T, StateError>;
