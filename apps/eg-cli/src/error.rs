//! Error types for the scenario runner.

use eg_energy::EnergyError;
use eg_solver::SolverError;
use eg_state::StateError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read scenario file: {path}")]
    ScenarioRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Energy term error: {0}")]
    Energy(#[from] EnergyError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Minimizer error: {0}")]
    Solver(#[from] SolverError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
