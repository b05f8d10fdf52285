//! Single-slot mappers that overwrite on write.

use crate::error::{StateError, StateResult};
use crate::mapper::{OverwritingMapper, StateMapper};
use eg_core::units::Duration;
use eg_core::{StateVector, ensure_nonzero};

/// Plain real number stored at one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalarMapper {
    index: usize,
}

impl ScalarMapper {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl StateMapper for ScalarMapper {
    type Object = f64;

    fn name(&self) -> &'static str {
        "scalar mapper"
    }

    fn min_dimension(&self) -> usize {
        self.index.saturating_add(1)
    }

    fn read(&self, state: &StateVector) -> StateResult<f64> {
        self.ensure_fits(state)?;
        Ok(state[self.index])
    }
}

impl OverwritingMapper for ScalarMapper {
    fn write(&self, buffer: &mut StateVector, object: &f64) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        buffer[self.index] = *object;
        Ok(())
    }
}

/// Signed duration stored at one index as a multiple of a fixed time scale.
///
/// Writes store `duration / scale`; reads return `stored * scale` at full
/// precision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationMapper {
    index: usize,
    scale: Duration,
}

impl DurationMapper {
    /// Create a duration mapper.
    ///
    /// # Errors
    /// Returns error if `scale` is zero or non-finite.
    pub fn new(index: usize, scale: Duration) -> StateResult<Self> {
        ensure_nonzero(scale.value, "duration scale").map_err(|_| StateError::InvalidConfig {
            what: "duration scale must be finite and non-zero",
        })?;
        Ok(Self { index, scale })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn scale(&self) -> Duration {
        self.scale
    }
}

impl StateMapper for DurationMapper {
    type Object = Duration;

    fn name(&self) -> &'static str {
        "duration mapper"
    }

    fn min_dimension(&self) -> usize {
        self.index.saturating_add(1)
    }

    fn read(&self, state: &StateVector) -> StateResult<Duration> {
        self.ensure_fits(state)?;
        Ok(self.scale * state[self.index])
    }
}

impl OverwritingMapper for DurationMapper {
    fn write(&self, buffer: &mut StateVector, object: &Duration) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        buffer[self.index] = object.value / self.scale.value;
        Ok(())
    }
}
