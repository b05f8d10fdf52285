//! Linear momentum conservation with mass transfer and applied forces.
//!
//! Per spatial dimension d:
//!
//! ```text
//! Φ_d   = Σ_c r_c·u_{c,d} + Σ_f F_{f,d}
//! res_d = (m1·v1_d − m0·v0_d) − dt·(Φ0_d + Φ1_d)/2
//! energy = Σ_d res_d² / (2·m_ref)
//! ```

use crate::channel::{Channels, ForceChannel, MassTransferChannel};
use crate::error::EnergyResult;
use crate::term::{ErrorTerm, reference_scale};
use eg_core::units::Mass;
use eg_core::{StateVector, covering_dimension};

#[derive(Clone, Debug)]
pub struct MomentumConservationTerm {
    mass: usize,
    velocity: Vec<usize>,
    channels: Channels,
    mass_reference: f64,
}

impl MomentumConservationTerm {
    /// Body with mass at `mass` and one velocity slot per spatial dimension.
    ///
    /// Every transfer velocity and force must have as many components as
    /// `velocity`.
    pub fn new(
        mass: usize,
        velocity: Vec<usize>,
        transfers: Vec<MassTransferChannel>,
        forces: Vec<ForceChannel>,
        mass_reference: Mass,
    ) -> EnergyResult<Self> {
        let channels = Channels::new(velocity.len(), transfers, forces)?;
        Ok(Self {
            mass,
            velocity,
            channels,
            mass_reference: reference_scale(mass_reference.value, "mass reference")?,
        })
    }

    pub fn spatial_dimension(&self) -> usize {
        self.velocity.len()
    }
}

impl ErrorTerm for MomentumConservationTerm {
    fn name(&self) -> &str {
        "momentum conservation"
    }

    fn min_dimension(&self) -> usize {
        covering_dimension(
            std::iter::once(self.mass)
                .chain(self.velocity.iter().copied())
                .chain(self.channels.indices()),
        )
    }

    fn accumulate(
        &self,
        gradient: &mut StateVector,
        previous: &StateVector,
        candidate: &StateVector,
        dt: f64,
    ) -> f64 {
        let m0 = previous[self.mass];
        let m1 = candidate[self.mass];
        let half_dt = dt / 2.0;
        let mut energy = 0.0;

        for (axis, &v) in self.velocity.iter().enumerate() {
            let flux = self.channels.momentum_flux(previous, axis)
                + self.channels.momentum_flux(candidate, axis);
            let residual = (m1 * candidate[v] - m0 * previous[v]) - half_dt * flux;
            energy += residual * residual / (2.0 * self.mass_reference);

            // ∂energy/∂residual
            let g = residual / self.mass_reference;
            gradient[self.mass] += g * candidate[v];
            gradient[v] += g * m1;
            for channel in &self.channels.transfers {
                let u = channel.velocity[axis];
                gradient[channel.rate] -= g * half_dt * candidate[u];
                gradient[u] -= g * half_dt * candidate[channel.rate];
            }
            for force in &self.channels.forces {
                gradient[force.components[axis]] -= g * half_dt;
            }
        }
        energy
    }
}
