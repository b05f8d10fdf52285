//! Holds externally driven slots at given values.

use crate::error::{EnergyError, EnergyResult};
use crate::term::{ErrorTerm, reference_scale};
use eg_core::{StateVector, covering_dimension, ensure_finite};
use eg_state::Vector3Mapper;
use nalgebra::Vector3;

/// `energy = Σ ½ · stiffness · (x_i − target_i)²` over the held slots.
///
/// Applied forces and transfer rates are inputs to a step rather than
/// unknowns; this term pins them so the minimization stays well posed.
#[derive(Clone, Debug)]
pub struct PrescribedValueTerm {
    targets: Vec<(usize, f64)>,
    /// J per unit² of the held quantity
    stiffness: f64,
}

impl PrescribedValueTerm {
    pub fn new(targets: Vec<(usize, f64)>, stiffness: f64) -> EnergyResult<Self> {
        if targets.is_empty() {
            return Err(EnergyError::InvalidConfig {
                what: "prescribed value term needs at least one slot".to_string(),
            });
        }
        for &(_, target) in &targets {
            ensure_finite(target, "prescribed target")?;
        }
        Ok(Self {
            targets,
            stiffness: reference_scale(stiffness, "prescribed stiffness")?,
        })
    }

    pub fn scalar(index: usize, target: f64, stiffness: f64) -> EnergyResult<Self> {
        Self::new(vec![(index, target)], stiffness)
    }

    pub fn vector3(mapper: Vector3Mapper, target: Vector3<f64>, stiffness: f64) -> EnergyResult<Self> {
        let targets = mapper.indices().into_iter().zip(target.iter().copied()).collect();
        Self::new(targets, stiffness)
    }

    pub fn targets(&self) -> &[(usize, f64)] {
        &self.targets
    }
}

impl ErrorTerm for PrescribedValueTerm {
    fn name(&self) -> &str {
        "prescribed value"
    }

    fn min_dimension(&self) -> usize {
        covering_dimension(self.targets.iter().map(|&(i, _)| i))
    }

    fn accumulate(
        &self,
        gradient: &mut StateVector,
        _previous: &StateVector,
        candidate: &StateVector,
        _dt: f64,
    ) -> f64 {
        let mut energy = 0.0;
        for &(index, target) in &self.targets {
            let offset = candidate[index] - target;
            energy += 0.5 * self.stiffness * offset * offset;
            gradient[index] += self.stiffness * offset;
        }
        energy
    }
}
