//! Mass conservation.

use crate::error::EnergyResult;
use crate::term::{ErrorTerm, reference_scale};
use eg_core::units::{Mass, SpecificEnergy};
use eg_core::{StateVector, covering_dimension};

/// Penalizes a mass change not explained by the transfer channels.
///
/// Channel rates are mass per second entering the body (negative when
/// leaving), integrated with the trapezoidal rule:
///
/// ```text
/// residual = (m1 − m0) − dt · Σ_c (r0_c + r1_c)/2
/// energy   = (e_ref / m_ref) · residual²
/// ```
///
/// With no channels the body is closed and the penalty does not depend
/// on `dt`.
#[derive(Clone, Debug)]
pub struct MassConservationTerm {
    mass: usize,
    rates: Vec<usize>,
    /// e_ref / m_ref, J/kg²
    weight: f64,
}

impl MassConservationTerm {
    /// Open body whose mass changes through the rate slots `rates`.
    pub fn new(
        mass: usize,
        rates: Vec<usize>,
        mass_reference: Mass,
        specific_energy_reference: SpecificEnergy,
    ) -> EnergyResult<Self> {
        let m_ref = reference_scale(mass_reference.value, "mass reference")?;
        let e_ref = reference_scale(
            specific_energy_reference.value,
            "specific energy reference",
        )?;
        Ok(Self {
            mass,
            rates,
            weight: e_ref / m_ref,
        })
    }

    /// Closed body: mass must not change.
    pub fn closed(
        mass: usize,
        mass_reference: Mass,
        specific_energy_reference: SpecificEnergy,
    ) -> EnergyResult<Self> {
        Self::new(mass, Vec::new(), mass_reference, specific_energy_reference)
    }

    pub fn is_closed(&self) -> bool {
        self.rates.is_empty()
    }
}

impl ErrorTerm for MassConservationTerm {
    fn name(&self) -> &str {
        "mass conservation"
    }

    fn min_dimension(&self) -> usize {
        covering_dimension(std::iter::once(self.mass).chain(self.rates.iter().copied()))
    }

    fn accumulate(
        &self,
        gradient: &mut StateVector,
        previous: &StateVector,
        candidate: &StateVector,
        dt: f64,
    ) -> f64 {
        let transferred: f64 = self
            .rates
            .iter()
            .map(|&r| previous[r] + candidate[r])
            .sum::<f64>()
            * dt
            / 2.0;
        let residual = (candidate[self.mass] - previous[self.mass]) - transferred;

        gradient[self.mass] += 2.0 * self.weight * residual;
        for &r in &self.rates {
            gradient[r] -= self.weight * residual * dt;
        }
        self.weight * residual * residual
    }
}
