//! Unconstrained minimization for energy-error objectives.
//!
//! Provides the "function of N variables with gradient" abstraction
//! ([`DifferentiableFunction`]), a nonlinear conjugate-gradient minimizer
//! (Polak–Ribière or Fletcher–Reeves) with a safeguarded line search, and
//! finite-difference gradient checks for validating analytic gradients.

pub mod cg;
pub mod error;
pub mod function;
pub mod gradient;

pub use cg::{BetaFormula, ConjugateGradientConfig, MinimizeResult, minimize, minimize_strict};
pub use error::{SolverError, SolverResult};
pub use function::{ClosureFunction, DifferentiableFunction, from_fn};
pub use gradient::{
    GradientCheck, central_difference_gradient, check_gradient, forward_difference_gradient,
};
