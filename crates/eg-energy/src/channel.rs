//! Mass-transfer and force channels shared by the momentum terms.

use crate::error::{EnergyError, EnergyResult};
use crate::term::ensure_spatial;
use eg_core::StateVector;
use eg_state::Vector3Mapper;

/// Mass entering the body at `rate` (kg/s, negative when leaving) and
/// carrying the velocity stored at `velocity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MassTransferChannel {
    pub rate: usize,
    /// One slot per spatial dimension.
    pub velocity: Vec<usize>,
}

impl MassTransferChannel {
    pub fn new(rate: usize, velocity: Vec<usize>) -> Self {
        Self { rate, velocity }
    }

    pub fn three_d(rate: usize, velocity: Vector3Mapper) -> Self {
        Self::new(rate, velocity.indices().to_vec())
    }

    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.rate).chain(self.velocity.iter().copied())
    }
}

/// An applied force, one slot per spatial dimension (N).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForceChannel {
    pub components: Vec<usize>,
}

impl ForceChannel {
    pub fn new(components: Vec<usize>) -> Self {
        Self { components }
    }

    pub fn three_d(force: Vector3Mapper) -> Self {
        Self::new(force.indices().to_vec())
    }
}

/// Channels acting on one body, checked against its spatial dimension.
#[derive(Clone, Debug, Default)]
pub(crate) struct Channels {
    pub transfers: Vec<MassTransferChannel>,
    pub forces: Vec<ForceChannel>,
}

impl Channels {
    pub fn new(
        spatial: usize,
        transfers: Vec<MassTransferChannel>,
        forces: Vec<ForceChannel>,
    ) -> EnergyResult<Self> {
        if spatial == 0 {
            return Err(EnergyError::InvalidConfig {
                what: "momentum terms need at least one spatial dimension".to_string(),
            });
        }
        for channel in &transfers {
            ensure_spatial(&channel.velocity, spatial, "transfer velocity components")?;
        }
        for channel in &forces {
            ensure_spatial(&channel.components, spatial, "force components")?;
        }
        Ok(Self { transfers, forces })
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.transfers
            .iter()
            .flat_map(|c| c.indices())
            .chain(self.forces.iter().flat_map(|f| f.components.iter().copied()))
    }

    /// Momentum inflow along `axis`: Σ_c r_c·u_{c,axis} + Σ_f F_{f,axis}.
    pub fn momentum_flux(&self, state: &StateVector, axis: usize) -> f64 {
        let advected: f64 = self
            .transfers
            .iter()
            .map(|c| state[c.rate] * state[c.velocity[axis]])
            .sum();
        let applied: f64 = self.forces.iter().map(|f| state[f.components[axis]]).sum();
        advected + applied
    }

    /// Σ_c r_c.
    pub fn net_rate(&self, state: &StateVector) -> f64 {
        self.transfers.iter().map(|c| state[c.rate]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_component_count() {
        let bad = MassTransferChannel::new(0, vec![1, 2]);
        assert!(Channels::new(3, vec![bad], vec![]).is_err());
        let bad = ForceChannel::new(vec![1]);
        assert!(Channels::new(2, vec![], vec![bad]).is_err());
        assert!(Channels::new(0, vec![], vec![]).is_err());
    }

    #[test]
    fn flux_sums_transfers_and_forces() {
        // [r, u, F1, F2]
        let channels = Channels::new(
            1,
            vec![MassTransferChannel::new(0, vec![1])],
            vec![ForceChannel::new(vec![2]), ForceChannel::new(vec![3])],
        )
        .unwrap();
        let state = StateVector::from_vec(vec![2.0, 3.0, -1.0, 0.5]);
        assert_eq!(channels.momentum_flux(&state, 0), 6.0 - 0.5);
        assert_eq!(channels.net_rate(&state), 2.0);
        assert_eq!(channels.indices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }
}
