//! Raw quaternion mapper.
//!
//! Layout is scalar first: `[w, x, y, z]` from the configured offset. The
//! four components are treated as independent reals, so a stored quaternion
//! is not necessarily unit length.

use crate::error::StateResult;
use crate::mapper::{AccumulatingMapper, StateMapper, VectorMapper};
use eg_core::StateVector;
use nalgebra::{Quaternion, Vector4};

/// Quaternion as a raw `[w, x, y, z]` vector, the form `write_vector` takes.
pub fn quaternion_components(q: &Quaternion<f64>) -> Vector4<f64> {
    Vector4::new(q.w, q.i, q.j, q.k)
}

/// Quaternion stored in four consecutive slots from `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuaternionMapper {
    offset: usize,
}

impl QuaternionMapper {
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// State indices in `[w, x, y, z]` order.
    pub fn indices(&self) -> [usize; 4] {
        std::array::from_fn(|slot| self.offset.saturating_add(slot))
    }
}

impl StateMapper for QuaternionMapper {
    type Object = Quaternion<f64>;

    fn name(&self) -> &'static str {
        "quaternion mapper"
    }

    fn min_dimension(&self) -> usize {
        self.offset.saturating_add(4)
    }

    fn read(&self, state: &StateVector) -> StateResult<Quaternion<f64>> {
        self.ensure_fits(state)?;
        let o = self.offset;
        Ok(Quaternion::new(state[o], state[o + 1], state[o + 2], state[o + 3]))
    }
}

impl AccumulatingMapper for QuaternionMapper {
    fn write(&self, buffer: &mut StateVector, object: &Quaternion<f64>) -> StateResult<()> {
        self.write_vector(buffer, &quaternion_components(object))
    }
}

impl VectorMapper for QuaternionMapper {
    /// Components in `[w, x, y, z]` order.
    type Vector = Vector4<f64>;

    fn write_vector(&self, buffer: &mut StateVector, vector: &Vector4<f64>) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        for (slot, component) in vector.iter().enumerate() {
            buffer[self.offset + slot] += component;
        }
        Ok(())
    }
}
