//! Trapezoidal kinematic consistency between a quantity and its rate.
//!
//! For each (value, rate) pair:
//!
//! ```text
//! residual = (x1 − x0) − dt·(v0 + v1)/2
//! energy   = ½ · scale · (residual / dt)²
//! ```
//!
//! Position↔velocity uses `scale = mass`; velocity↔acceleration uses
//! `scale = mass · t_ref²` so both come out in joules.

use crate::error::{EnergyError, EnergyResult};
use crate::term::{ErrorTerm, reference_scale};
use eg_core::units::{Mass, Time};
use eg_core::{StateVector, covering_dimension};
use eg_state::Vector3Mapper;

/// State slots of one quantity and of its time derivative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KinematicPair {
    pub value: usize,
    pub rate: usize,
}

impl KinematicPair {
    pub fn new(value: usize, rate: usize) -> Self {
        Self { value, rate }
    }
}

#[derive(Clone, Debug)]
pub struct KinematicTerm {
    name: &'static str,
    pairs: Vec<KinematicPair>,
    scale: f64,
}

impl KinematicTerm {
    /// Position↔velocity consistency, weighted by `mass`.
    pub fn position_velocity(mass: Mass, pairs: Vec<KinematicPair>) -> EnergyResult<Self> {
        let scale = reference_scale(mass.value, "kinematic mass")?;
        Self::with_scale("position kinematics", pairs, scale)
    }

    /// Velocity↔acceleration consistency, weighted by `mass · time_reference²`.
    pub fn velocity_acceleration(
        mass: Mass,
        time_reference: Time,
        pairs: Vec<KinematicPair>,
    ) -> EnergyResult<Self> {
        let mass = reference_scale(mass.value, "kinematic mass")?;
        let t = reference_scale(time_reference.value, "kinematic time reference")?;
        Self::with_scale("velocity kinematics", pairs, mass * t * t)
    }

    /// Pairs for the three components of two 3-vectors.
    pub fn pairs_3d(value: Vector3Mapper, rate: Vector3Mapper) -> Vec<KinematicPair> {
        value
            .indices()
            .into_iter()
            .zip(rate.indices())
            .map(|(v, r)| KinematicPair::new(v, r))
            .collect()
    }

    fn with_scale(
        name: &'static str,
        pairs: Vec<KinematicPair>,
        scale: f64,
    ) -> EnergyResult<Self> {
        if pairs.is_empty() {
            return Err(EnergyError::InvalidConfig {
                what: format!("{name} needs at least one value/rate pair"),
            });
        }
        Ok(Self { name, pairs, scale })
    }

    pub fn pairs(&self) -> &[KinematicPair] {
        &self.pairs
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl ErrorTerm for KinematicTerm {
    fn name(&self) -> &str {
        self.name
    }

    fn min_dimension(&self) -> usize {
        covering_dimension(self.pairs.iter().flat_map(|p| [p.value, p.rate]))
    }

    fn accumulate(
        &self,
        gradient: &mut StateVector,
        previous: &StateVector,
        candidate: &StateVector,
        dt: f64,
    ) -> f64 {
        let mut energy = 0.0;
        for pair in &self.pairs {
            let residual = (candidate[pair.value] - previous[pair.value])
                - dt * (previous[pair.rate] + candidate[pair.rate]) / 2.0;
            let rate_error = residual / dt;
            energy += 0.5 * self.scale * rate_error * rate_error;
            gradient[pair.value] += self.scale * residual / (dt * dt);
            gradient[pair.rate] -= self.scale * residual / (2.0 * dt);
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::testing::assert_gradient_matches;
    use eg_core::units::{kg, s};
    use eg_core::zero_state;

    fn one_d() -> KinematicTerm {
        KinematicTerm::position_velocity(kg(1.0), vec![KinematicPair::new(0, 1)]).unwrap()
    }

    #[test]
    fn displaced_position_unit_step() {
        let term = one_d();
        let previous = zero_state(2);
        let candidate = StateVector::from_vec(vec![2.0, 0.0]);
        let mut g = zero_state(2);

        let e = term.evaluate(&mut g, &previous, &candidate, 1.0).unwrap();

        assert_eq!(e, 2.0);
        assert_eq!(g[0], 2.0);
        assert_eq!(g[1], -1.0);
    }

    #[test]
    fn displaced_position_double_step() {
        let term = one_d();
        let previous = zero_state(2);
        let candidate = StateVector::from_vec(vec![2.0, 0.0]);
        let mut g = zero_state(2);

        let e = term.evaluate(&mut g, &previous, &candidate, 2.0).unwrap();

        assert_eq!(e, 0.5);
        assert_eq!(g[0], 0.5);
        assert_eq!(g[1], -0.5);
    }

    #[test]
    fn consistent_step_adds_nothing() {
        let term = one_d();
        // x1 - x0 = 3 = dt (v0 + v1) / 2 with dt = 1.5
        let previous = StateVector::from_vec(vec![1.0, 1.0]);
        let candidate = StateVector::from_vec(vec![4.0, 3.0]);
        let mut g = StateVector::from_vec(vec![0.25, -0.5]);

        let e = term.evaluate(&mut g, &previous, &candidate, 1.5).unwrap();

        assert_eq!(e, 0.0);
        assert_eq!(g, StateVector::from_vec(vec![0.25, -0.5]));
    }

    #[test]
    fn acceleration_scale_includes_time_reference() {
        let term =
            KinematicTerm::velocity_acceleration(kg(2.0), s(3.0), vec![KinematicPair::new(0, 1)])
                .unwrap();
        assert_eq!(term.scale(), 18.0);
        assert_eq!(term.name(), "velocity kinematics");
    }

    #[test]
    fn three_dimensional_pairs() {
        let pairs = KinematicTerm::pairs_3d(Vector3Mapper::new(0), Vector3Mapper::new(3));
        assert_eq!(pairs[2], KinematicPair::new(2, 5));
        let term = KinematicTerm::position_velocity(kg(1.0), pairs).unwrap();
        assert_eq!(term.min_dimension(), 6);
        assert!(!term.is_valid_for_dimension(5));

        let previous = StateVector::from_vec(vec![0.0, 1.0, 2.0, 0.5, -0.5, 1.0]);
        let candidate = StateVector::from_vec(vec![0.3, 0.2, 2.9, 0.1, 0.7, -1.0]);
        assert_gradient_matches(&term, &previous, &candidate, 0.4);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(KinematicTerm::position_velocity(kg(0.0), vec![KinematicPair::new(0, 1)]).is_err());
        assert!(KinematicTerm::position_velocity(kg(f64::NAN), vec![KinematicPair::new(0, 1)]).is_err());
        assert!(KinematicTerm::position_velocity(kg(1.0), vec![]).is_err());
        assert!(
            KinematicTerm::velocity_acceleration(kg(1.0), s(-1.0), vec![KinematicPair::new(0, 1)])
                .is_err()
        );
    }
}
