//! One time step: minimize the composite error from the previous state.

use crate::function::ErrorFunction;
use crate::term::ErrorTerm;
use eg_core::StateVector;
use eg_core::units::Time;
use eg_solver::{ConjugateGradientConfig, MinimizeResult, SolverResult, minimize};
use tracing::debug;

/// Find the next state by minimizing the summed term energies over a step
/// of length `dt`, starting the search at `previous`.
pub fn advance(
    previous: &StateVector,
    dt: Time,
    terms: &[Box<dyn ErrorTerm>],
    config: &ConjugateGradientConfig,
) -> SolverResult<MinimizeResult> {
    let function = ErrorFunction::new(previous, dt, terms)?;
    let result = minimize(&function, previous.clone(), config)?;
    debug!(
        dt = function.dt(),
        energy = result.value,
        iterations = result.iterations,
        converged = result.converged,
        "advanced one step"
    );
    Ok(result)
}
