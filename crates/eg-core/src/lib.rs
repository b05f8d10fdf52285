//! eg-core: shared foundation for ergon.
//!
//! - units: uom SI types and constructors for reference scales
//! - numeric: `Real`, tolerances and scalar validation
//! - state: the flat state vector
//! - error: the shared scalar-validation error

pub mod error;
pub mod numeric;
pub mod state;
pub mod units;

pub use error::{EgError, EgResult};
pub use numeric::*;
pub use state::*;
pub use units::*;
