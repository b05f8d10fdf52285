//! Scenario files: one point mass under a constant force, optionally
//! exchanging mass with its surroundings.

use crate::error::{CliError, CliResult};
use eg_core::units::constants::G0_MPS2;
use eg_solver::{BetaFormula, ConjugateGradientConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    pub body: Body,
    /// Constant applied force (N).
    #[serde(default)]
    pub force: [f64; 3],
    #[serde(default)]
    pub mass_transfer: Option<MassTransfer>,
    /// Time step (s).
    pub dt: f64,
    pub steps: usize,
    #[serde(default)]
    pub references: References,
    #[serde(default)]
    pub solver: SolverSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// kg
    pub mass: f64,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
}

/// Mass entering the body at `rate` (negative when leaving), carrying
/// `velocity`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassTransfer {
    /// kg/s
    pub rate: f64,
    /// m/s, absolute
    pub velocity: [f64; 3],
}

/// Scales that bring every term to joules of similar size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct References {
    /// kg
    pub mass: f64,
    /// s
    pub time: f64,
    /// J/kg
    pub specific_energy: f64,
    /// Stiffness holding forces and transfer inputs at their given values.
    pub hold_stiffness: f64,
}

impl Default for References {
    fn default() -> Self {
        Self {
            mass: 1.0,
            time: 1.0,
            specific_energy: 1.0,
            hold_stiffness: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    #[default]
    PolakRibiere,
    FletcherReeves,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub gradient_tol: f64,
    pub max_iterations: usize,
    pub formula: Formula,
    /// Fail the run on the first step that does not converge.
    pub strict: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            gradient_tol: 1e-9,
            max_iterations: 2000,
            formula: Formula::PolakRibiere,
            strict: false,
        }
    }
}

impl SolverSettings {
    pub fn config(&self) -> ConjugateGradientConfig {
        ConjugateGradientConfig {
            max_iterations: self.max_iterations,
            formula: match self.formula {
                Formula::PolakRibiere => BetaFormula::PolakRibiere,
                Formula::FletcherReeves => BetaFormula::FletcherReeves,
            },
            ..ConjugateGradientConfig::with_tolerance(self.gradient_tol)
        }
    }
}

fn default_name() -> String {
    "scenario".to_string()
}

pub fn load_yaml(path: &Path) -> CliResult<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ScenarioRead {
        path: path.to_path_buf(),
        source,
    })?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    validate(&scenario)?;
    Ok(scenario)
}

pub fn validate(scenario: &Scenario) -> CliResult<()> {
    let positive = [
        ("body.mass", scenario.body.mass),
        ("dt", scenario.dt),
        ("references.mass", scenario.references.mass),
        ("references.time", scenario.references.time),
        ("references.specific_energy", scenario.references.specific_energy),
        ("references.hold_stiffness", scenario.references.hold_stiffness),
    ];
    for (what, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(CliError::Validation(format!(
                "{what} must be positive and finite, got {value}"
            )));
        }
    }

    let mut vectors = vec![
        ("body.position", scenario.body.position),
        ("body.velocity", scenario.body.velocity),
        ("force", scenario.force),
    ];
    if let Some(transfer) = &scenario.mass_transfer {
        if !transfer.rate.is_finite() {
            return Err(CliError::Validation(format!(
                "mass_transfer.rate must be finite, got {}",
                transfer.rate
            )));
        }
        vectors.push(("mass_transfer.velocity", transfer.velocity));
    }
    for (what, v) in vectors {
        if v.iter().any(|c| !c.is_finite()) {
            return Err(CliError::Validation(format!("{what} must be finite, got {v:?}")));
        }
    }

    if !(scenario.solver.gradient_tol.is_finite() && scenario.solver.gradient_tol >= 0.0) {
        return Err(CliError::Validation(format!(
            "solver.gradient_tol must be finite and >= 0, got {}",
            scenario.solver.gradient_tol
        )));
    }
    Ok(())
}

/// Default scenario: one second of free fall.
pub fn template() -> Scenario {
    Scenario {
        name: "free-fall".to_string(),
        body: Body {
            mass: 1.0,
            position: [0.0, 0.0, 100.0],
            velocity: [0.0, 0.0, 0.0],
        },
        force: [0.0, 0.0, -G0_MPS2],
        mass_transfer: None,
        dt: 0.1,
        steps: 10,
        references: References::default(),
        solver: SolverSettings::default(),
    }
}
