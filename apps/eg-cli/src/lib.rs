//! Scenario loading and time stepping behind the `ergon` command line.

pub mod error;
pub mod runner;
pub mod scenario;

pub use error::{CliError, CliResult};
pub use runner::{Layout, Model, Sample, simulate};
pub use scenario::{Scenario, load_yaml, template};
