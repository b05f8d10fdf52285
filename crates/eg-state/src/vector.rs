//! Vector mappers that accumulate on write.

use crate::error::StateResult;
use crate::mapper::{AccumulatingMapper, StateMapper, VectorMapper};
use eg_core::StateVector;
use nalgebra::{Vector1, Vector3};

/// One-component vector stored at one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vector1Mapper {
    index: usize,
}

impl Vector1Mapper {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl StateMapper for Vector1Mapper {
    type Object = Vector1<f64>;

    fn name(&self) -> &'static str {
        "vector1 mapper"
    }

    fn min_dimension(&self) -> usize {
        self.index.saturating_add(1)
    }

    fn read(&self, state: &StateVector) -> StateResult<Vector1<f64>> {
        self.ensure_fits(state)?;
        Ok(Vector1::new(state[self.index]))
    }
}

impl AccumulatingMapper for Vector1Mapper {
    fn write(&self, buffer: &mut StateVector, object: &Vector1<f64>) -> StateResult<()> {
        self.write_vector(buffer, object)
    }
}

impl VectorMapper for Vector1Mapper {
    type Vector = Vector1<f64>;

    fn write_vector(&self, buffer: &mut StateVector, vector: &Vector1<f64>) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        buffer[self.index] += vector.x;
        Ok(())
    }
}

/// Three-component vector stored in three consecutive slots from `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vector3Mapper {
    offset: usize,
}

impl Vector3Mapper {
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// State index of component `axis` (0 = x, 1 = y, 2 = z).
    pub fn index(&self, axis: usize) -> usize {
        self.offset.saturating_add(axis)
    }

    /// Component indices. Past `usize::MAX` they saturate; such a mapper
    /// fits no state.
    pub fn indices(&self) -> [usize; 3] {
        std::array::from_fn(|axis| self.index(axis))
    }
}

impl StateMapper for Vector3Mapper {
    type Object = Vector3<f64>;

    fn name(&self) -> &'static str {
        "vector3 mapper"
    }

    fn min_dimension(&self) -> usize {
        self.offset.saturating_add(3)
    }

    fn read(&self, state: &StateVector) -> StateResult<Vector3<f64>> {
        self.ensure_fits(state)?;
        Ok(Vector3::new(
            state[self.offset],
            state[self.offset + 1],
            state[self.offset + 2],
        ))
    }
}

impl AccumulatingMapper for Vector3Mapper {
    fn write(&self, buffer: &mut StateVector, object: &Vector3<f64>) -> StateResult<()> {
        self.write_vector(buffer, object)
    }
}

impl VectorMapper for Vector3Mapper {
    type Vector = Vector3<f64>;

    fn write_vector(&self, buffer: &mut StateVector, vector: &Vector3<f64>) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        for (axis, component) in vector.iter().enumerate() {
            buffer[self.offset + axis] += component;
        }
        Ok(())
    }
}
