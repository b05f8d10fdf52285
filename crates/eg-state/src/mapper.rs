//! Mapper traits.

use crate::error::{StateError, StateResult};
use eg_core::StateVector;

/// Read side shared by every mapper.
///
/// Implementors are immutable and hold no reference to a state vector
/// between calls, so one mapper can serve every time step of a simulation.
pub trait StateMapper: Send + Sync {
    /// Physical object this mapper converts to and from.
    type Object;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Smallest state length this mapper can operate against.
    fn min_dimension(&self) -> usize;

    /// Whether a state of length `dimension` is long enough.
    fn is_valid_for_dimension(&self, dimension: usize) -> bool {
        dimension >= self.min_dimension()
    }

    /// Reject a state (or buffer) shorter than [`Self::min_dimension`].
    fn ensure_fits(&self, state: &StateVector) -> StateResult<()> {
        if self.is_valid_for_dimension(state.len()) {
            Ok(())
        } else {
            Err(StateError::TooShort {
                what: self.name(),
                required: self.min_dimension(),
                actual: state.len(),
            })
        }
    }

    /// Reconstruct the object from `state` without mutating it.
    fn read(&self, state: &StateVector) -> StateResult<Self::Object>;
}

/// Mappers whose `write` replaces the slot contents.
pub trait OverwritingMapper: StateMapper {
    /// Store `object` at this mapper's slots, discarding what was there.
    fn write(&self, buffer: &mut StateVector, object: &Self::Object) -> StateResult<()>;
}

/// Mappers whose `write` adds into the slot contents.
///
/// Writing A then B into a zeroed buffer reads back as A + B wherever the
/// object type has an addition.
pub trait AccumulatingMapper: StateMapper {
    /// Add `object`'s components into this mapper's slots.
    fn write(&self, buffer: &mut StateVector, object: &Self::Object) -> StateResult<()>;
}

/// Accumulating mappers that also accept a raw vector of matching dimension.
///
/// Lets a sum or difference vector that is not itself a well-formed object
/// (e.g. a non-unit quaternion delta) be projected the same way.
pub trait VectorMapper: AccumulatingMapper {
    /// Raw vector type with one component per slot.
    type Vector;

    /// Add `vector`'s components into this mapper's slots.
    fn write_vector(&self, buffer: &mut StateVector, vector: &Self::Vector) -> StateResult<()>;
}
