//! Energy-error terms and the composite objective built from them.
//!
//! Each term turns one physical law into a non-negative penalty, in joules,
//! on how badly a candidate next state violates that law over a step from a
//! known previous state. Laws are written as trapezoidal residuals
//! (observed change minus the change predicted from the mean of the rates
//! at both ends) and squared with reference scales that put every term in
//! energy units of comparable size.
//!
//! [`ErrorFunction`] sums a set of terms for one step and is what the
//! conjugate-gradient minimizer in `eg-solver` sees; [`advance`] runs that
//! minimization.

pub mod channel;
pub mod error;
pub mod function;
pub mod kinematic;
pub mod mass;
pub mod momentum;
pub mod newton;
pub mod prescribed;
pub mod step;
pub mod term;
pub mod versor;

pub use channel::{ForceChannel, MassTransferChannel};
pub use error::{EnergyError, EnergyResult};
pub use function::{ErrorFunction, PARALLEL_TERM_THRESHOLD, TermEnergy};
pub use kinematic::{KinematicPair, KinematicTerm};
pub use mass::MassConservationTerm;
pub use momentum::MomentumConservationTerm;
pub use newton::NewtonTerm;
pub use prescribed::PrescribedValueTerm;
pub use step::advance;
pub use term::{ErrorTerm, ensure_term_fits, validate_time_step};
pub use versor::VersorTerm;
