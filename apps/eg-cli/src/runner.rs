//! Step a scenario through time by repeated energy minimization.

use crate::error::{CliError, CliResult};
use crate::scenario::Scenario;
use eg_core::units::{j_per_kg, kg, s};
use eg_core::{StateVector, zero_state};
use eg_energy::{
    ErrorTerm, ForceChannel, KinematicTerm, MassConservationTerm, MassTransferChannel,
    MomentumConservationTerm, NewtonTerm, PrescribedValueTerm, advance,
};
use eg_solver::{ConjugateGradientConfig, SolverError};
use eg_state::{AccumulatingMapper, OverwritingMapper, ScalarMapper, StateMapper, Vector3Mapper};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::{info, warn};

/// Slot assignment for one point mass:
/// `[m, r, x(3), v(3), a(3), F(3), u(3)]`.
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub mass: ScalarMapper,
    pub transfer_rate: ScalarMapper,
    pub position: Vector3Mapper,
    pub velocity: Vector3Mapper,
    pub acceleration: Vector3Mapper,
    pub force: Vector3Mapper,
    pub transfer_velocity: Vector3Mapper,
}

impl Layout {
    pub const DIMENSION: usize = 17;

    pub fn new() -> Self {
        Self {
            mass: ScalarMapper::new(0),
            transfer_rate: ScalarMapper::new(1),
            position: Vector3Mapper::new(2),
            velocity: Vector3Mapper::new(5),
            acceleration: Vector3Mapper::new(8),
            force: Vector3Mapper::new(11),
            transfer_velocity: Vector3Mapper::new(14),
        }
    }

    /// `(name, first slot, width)` for display.
    pub fn slots(&self) -> Vec<(&'static str, usize, usize)> {
        vec![
            ("mass", self.mass.index(), 1),
            ("transfer rate", self.transfer_rate.index(), 1),
            ("position", self.position.offset(), 3),
            ("velocity", self.velocity.offset(), 3),
            ("acceleration", self.acceleration.offset(), 3),
            ("force", self.force.offset(), 3),
            ("transfer velocity", self.transfer_velocity.offset(), 3),
        ]
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout, terms and initial state for a scenario.
pub struct Model {
    pub layout: Layout,
    pub terms: Vec<Box<dyn ErrorTerm>>,
    pub initial: StateVector,
}

impl Model {
    pub fn build(scenario: &Scenario) -> CliResult<Self> {
        let layout = Layout::new();
        let refs = &scenario.references;
        let mass_ref = kg(refs.mass);
        let time_ref = s(refs.time);

        let transfers = vec![MassTransferChannel::three_d(
            layout.transfer_rate.index(),
            layout.transfer_velocity,
        )];
        let forces = vec![ForceChannel::three_d(layout.force)];
        let velocity = layout.velocity.indices().to_vec();
        let acceleration = layout.acceleration.indices().to_vec();

        let (rate, transfer_velocity) = match &scenario.mass_transfer {
            Some(t) => (t.rate, Vector3::from(t.velocity)),
            None => (0.0, Vector3::zeros()),
        };
        let force = Vector3::from(scenario.force);

        let mut held = vec![(layout.transfer_rate.index(), rate)];
        held.extend(layout.force.indices().into_iter().zip(force.iter().copied()));
        held.extend(
            layout
                .transfer_velocity
                .indices()
                .into_iter()
                .zip(transfer_velocity.iter().copied()),
        );

        let terms: Vec<Box<dyn ErrorTerm>> = vec![
            Box::new(MassConservationTerm::new(
                layout.mass.index(),
                vec![layout.transfer_rate.index()],
                mass_ref,
                j_per_kg(refs.specific_energy),
            )?),
            Box::new(KinematicTerm::position_velocity(
                mass_ref,
                KinematicTerm::pairs_3d(layout.position, layout.velocity),
            )?),
            Box::new(KinematicTerm::velocity_acceleration(
                mass_ref,
                time_ref,
                KinematicTerm::pairs_3d(layout.velocity, layout.acceleration),
            )?),
            Box::new(MomentumConservationTerm::new(
                layout.mass.index(),
                velocity.clone(),
                transfers.clone(),
                forces.clone(),
                mass_ref,
            )?),
            Box::new(NewtonTerm::new(
                layout.mass.index(),
                velocity,
                acceleration,
                transfers,
                forces,
                mass_ref,
                time_ref,
            )?),
            Box::new(PrescribedValueTerm::new(held, refs.hold_stiffness)?),
        ];

        let body = &scenario.body;
        let v0 = Vector3::from(body.velocity);
        let a0 = (force + rate * (transfer_velocity - v0)) / body.mass;

        let mut initial = zero_state(Layout::DIMENSION);
        layout.mass.write(&mut initial, &body.mass)?;
        layout.transfer_rate.write(&mut initial, &rate)?;
        layout.position.write(&mut initial, &Vector3::from(body.position))?;
        layout.velocity.write(&mut initial, &v0)?;
        layout.acceleration.write(&mut initial, &a0)?;
        layout.force.write(&mut initial, &force)?;
        layout.transfer_velocity.write(&mut initial, &transfer_velocity)?;

        Ok(Self {
            layout,
            terms,
            initial,
        })
    }

    pub fn sample(
        &self,
        step: usize,
        time: f64,
        state: &StateVector,
        energy: f64,
        iterations: usize,
        converged: bool,
    ) -> CliResult<Sample> {
        Ok(Sample {
            step,
            time,
            mass: self.layout.mass.read(state)?,
            position: self.layout.position.read(state)?.into(),
            velocity: self.layout.velocity.read(state)?.into(),
            acceleration: self.layout.acceleration.read(state)?.into(),
            energy,
            iterations,
            converged,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Sample {
    pub step: usize,
    /// s
    pub time: f64,
    pub mass: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub acceleration: [f64; 3],
    /// Residual energy of the step (J).
    pub energy: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Run `steps` steps (the scenario's own count when `None`). The first
/// sample is the initial state.
pub fn simulate(scenario: &Scenario, steps: Option<usize>) -> CliResult<Vec<Sample>> {
    let model = Model::build(scenario)?;
    let config: ConjugateGradientConfig = scenario.solver.config();
    let steps = steps.unwrap_or(scenario.steps);

    let mut state = model.initial.clone();
    let mut samples = Vec::with_capacity(steps + 1);
    samples.push(model.sample(0, 0.0, &state, 0.0, 0, true)?);

    for step in 1..=steps {
        let result = advance(&state, s(scenario.dt), &model.terms, &config)?;
        if !result.converged {
            if scenario.solver.strict {
                return Err(CliError::Solver(SolverError::ConvergenceFailed {
                    what: format!(
                        "step {step}: gradient norm {:e} after {} iterations",
                        result.gradient_norm, result.iterations
                    ),
                }));
            }
            warn!(step, gradient_norm = result.gradient_norm, "step did not converge");
        }
        state = result.x;
        samples.push(model.sample(
            step,
            step as f64 * scenario.dt,
            &state,
            result.value,
            result.iterations,
            result.converged,
        )?);
    }

    info!(scenario = %scenario.name, steps, "simulation finished");
    Ok(samples)
}
