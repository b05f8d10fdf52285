//! Newton's second law on the candidate state.
//!
//! Mass entering at rate r with velocity u pushes the body by r·(u − v), so
//! per spatial dimension d:
//!
//! ```text
//! res_d  = Σ_f F_{f,d} + Σ_c r_c·(u_{c,d} − v_d) − m·a_d
//! energy = Σ_d ½ · t_ref² · res_d² / m_ref
//! ```
//!
//! The previous state and `dt` do not enter.

use crate::channel::{Channels, ForceChannel, MassTransferChannel};
use crate::error::EnergyResult;
use crate::term::{ErrorTerm, ensure_spatial, reference_scale};
use eg_core::units::{Mass, Time};
use eg_core::{StateVector, covering_dimension};

#[derive(Clone, Debug)]
pub struct NewtonTerm {
    mass: usize,
    velocity: Vec<usize>,
    acceleration: Vec<usize>,
    channels: Channels,
    /// t_ref² / m_ref
    weight: f64,
}

impl NewtonTerm {
    pub fn new(
        mass: usize,
        velocity: Vec<usize>,
        acceleration: Vec<usize>,
        transfers: Vec<MassTransferChannel>,
        forces: Vec<ForceChannel>,
        mass_reference: Mass,
        time_reference: Time,
    ) -> EnergyResult<Self> {
        ensure_spatial(&acceleration, velocity.len(), "acceleration components")?;
        let channels = Channels::new(velocity.len(), transfers, forces)?;
        let m_ref = reference_scale(mass_reference.value, "mass reference")?;
        let t_ref = reference_scale(time_reference.value, "time reference")?;
        Ok(Self {
            mass,
            velocity,
            acceleration,
            channels,
            weight: t_ref * t_ref / m_ref,
        })
    }
}

impl ErrorTerm for NewtonTerm {
    fn name(&self) -> &str {
        "newton second law"
    }

    fn min_dimension(&self) -> usize {
        covering_dimension(
            std::iter::once(self.mass)
                .chain(self.velocity.iter().copied())
                .chain(self.acceleration.iter().copied())
                .chain(self.channels.indices()),
        )
    }

    fn accumulate(
        &self,
        gradient: &mut StateVector,
        _previous: &StateVector,
        candidate: &StateVector,
        _dt: f64,
    ) -> f64 {
        let m = candidate[self.mass];
        let net_rate = self.channels.net_rate(candidate);
        let mut energy = 0.0;

        for (axis, (&v, &a)) in self.velocity.iter().zip(&self.acceleration).enumerate() {
            // Σ r·u + Σ F − (Σ r)·v − m·a
            let residual = self.channels.momentum_flux(candidate, axis)
                - net_rate * candidate[v]
                - m * candidate[a];
            energy += 0.5 * self.weight * residual * residual;

            let g = self.weight * residual;
            for force in &self.channels.forces {
                gradient[force.components[axis]] += g;
            }
            for channel in &self.channels.transfers {
                let u = channel.velocity[axis];
                gradient[channel.rate] += g * (candidate[u] - candidate[v]);
                gradient[u] += g * candidate[channel.rate];
            }
            gradient[v] -= g * net_rate;
            gradient[self.mass] -= g * candidate[a];
            gradient[a] -= g * m;
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

    // [m, v, a, F]
    fn forced_1d(t_ref: f64) -> NewtonTerm {
        NewtonTerm::new(
            0,
            vec![1],
            vec![2],
            vec![],
            vec![ForceChannel::new(vec![3])],
            kg(1.0),
            s(t_ref),
        )
        .unwrap()
    }

    #[test]
    fn force_equals_mass_times_acceleration() {
        let term = forced_1d(1.0);
        let x = StateVector::from_vec(vec![2.0, 7.0, -4.9, -9.8]);
        let mut g = zero_state(4);
        assert_eq!(term.evaluate(&mut g, &x, &x, 0.1).unwrap(), 0.0);
        assert_eq!(g, zero_state(4));
    }

    #[test]
    fn unbalanced_force() {
        let term = forced_1d(2.0);
        let x = StateVector::from_vec(vec![1.0, 0.0, 0.0, 3.0]);
        let mut g = zero_state(4);

        // residual 3, weight 4: energy = ½·4·9
        let e = term.evaluate(&mut g, &x, &x, 1.0).unwrap();

        assert_eq!(e, 18.0);
        assert_eq!(g[3], 12.0);
        assert_eq!(g[2], -12.0);
        assert_eq!(g[0], 0.0);
    }

    #[test]
    fn free_body_must_not_accelerate() {
        let term = NewtonTerm::new(0, vec![1], vec![2], vec![], vec![], kg(1.0), s(1.0)).unwrap();
        let x = StateVector::from_vec(vec![2.0, 5.0, 1.0]);
        let mut g = zero_state(3);
        // residual −m·a = −2
        assert_eq!(term.evaluate(&mut g, &x, &x, 1.0).unwrap(), 2.0);
        assert_eq!(g, StateVector::from_vec(vec![2.0, 0.0, 4.0]));
    }

    #[test]
    fn independent_of_previous_state_and_step() {
        let term = forced_1d(1.0);
        let candidate = StateVector::from_vec(vec![1.5, 0.2, 1.0, 0.5]);
        let mut g1 = zero_state(4);
        let mut g2 = zero_state(4);
        let e1 = term.evaluate(&mut g1, &zero_state(4), &candidate, 0.1).unwrap();
        let e2 = term
            .evaluate(&mut g2, &StateVector::from_element(4, 9.0), &candidate, 3.0)
            .unwrap();
        assert_eq!(e1, e2);
        assert_eq!(g1, g2);
    }

    #[test]
    fn gradient_with_transfer_3d() {
        // [m, v(3), a(3), r, u(3), F(3)]
        let term = NewtonTerm::new(
            0,
            vec![1, 2, 3],
            vec![4, 5, 6],
            vec![MassTransferChannel::new(7, vec![8, 9, 10])],
            vec![ForceChannel::new(vec![11, 12, 13])],
            kg(2.0),
            s(0.5),
        )
        .unwrap();
        assert_eq!(term.min_dimension(), 14);
        let previous = zero_state(14);
        let candidate = StateVector::from_fn(14, |i, _| 0.5 + 0.25 * (i as f64).cos());
        assert_gradient_matches(&term, &previous, &candidate, 0.1);
    }

    #[test]
    fn rejects_bad_configuration() {
        let short_acceleration = NewtonTerm::new(
            0,
            vec![1, 2],
            vec![3],
            vec![],
            vec![ForceChannel::new(vec![4, 5])],
            kg(1.0),
            s(1.0),
        );
        assert!(short_acceleration.is_err());

        let zero_time = NewtonTerm::new(
            0,
            vec![1],
            vec![2],
            vec![],
            vec![ForceChannel::new(vec![3])],
            kg(1.0),
            s(0.0),
        );
        assert!(zero_time.is_err());
    }
}
