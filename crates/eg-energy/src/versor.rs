//! Soft unit-norm constraint on a quaternion stored in the state.
//!
//! The minimizer treats the four components as free reals, so a rotation
//! quaternion drifts off the unit sphere unless something pulls it back.
//! The norm deviation is turned into an equivalent surface speed:
//!
//! ```text
//! res    = (‖q‖ − 1) · L_ref / dt
//! energy = ½ · m_ref · res²
//! ```

use crate::error::{EnergyError, EnergyResult};
use crate::term::{ErrorTerm, reference_scale};
use eg_core::StateVector;
use eg_core::units::{Length, Mass};
use eg_state::{DEGENERATE_NORM, QuaternionMapper, StateMapper};
use nalgebra::Vector4;

#[derive(Clone, Copy, Debug)]
pub struct VersorTerm {
    offset: usize,
    mass_reference: f64,
    length_reference: f64,
}

impl VersorTerm {
    /// Keep the quaternion stored at `quaternion` unit length.
    pub fn new(
        quaternion: QuaternionMapper,
        mass_reference: Mass,
        length_reference: Length,
    ) -> EnergyResult<Self> {
        if quaternion.offset().checked_add(4).is_none() {
            return Err(EnergyError::InvalidConfig {
                what: format!(
                    "versor quaternion at offset {} runs past the last index",
                    quaternion.offset()
                ),
            });
        }
        Ok(Self {
            offset: quaternion.offset(),
            mass_reference: reference_scale(mass_reference.value, "mass reference")?,
            length_reference: reference_scale(length_reference.value, "length reference")?,
        })
    }

    fn components(&self, state: &StateVector) -> Vector4<f64> {
        Vector4::from_fn(|i, _| state[self.offset + i])
    }
}

impl ErrorTerm for VersorTerm {
    fn name(&self) -> &str {
        "versor"
    }

    fn min_dimension(&self) -> usize {
        QuaternionMapper::new(self.offset).min_dimension()
    }

    fn accumulate(
        &self,
        gradient: &mut StateVector,
        _previous: &StateVector,
        candidate: &StateVector,
        dt: f64,
    ) -> f64 {
        let q = self.components(candidate);
        let norm = q.norm();
        let speed = self.length_reference / dt;
        let residual = (norm - 1.0) * speed;

        // Direction q/‖q‖ is undefined at the origin.
        if norm > DEGENERATE_NORM {
            let scale = self.mass_reference * residual * speed / norm;
            for i in 0..4 {
                gradient[self.offset + i] += scale * q[i];
            }
        }
        0.5 * self.mass_reference * residual * residual
    }
}
