//! Composite mappers for [`Harmonic`] functors.
//!
//! Contiguous layout from the base offset:
//!
//! | slot | content | write |
//! |---|---|---|
//! | 0 | angular frequency ω | overwrite |
//! | 1 | decay rate λ | overwrite |
//! | 2 | time origin (duration mapper) | overwrite |
//! | 3.. | constant, linear, quadratic, cosine, sine coefficients | accumulate |
//!
//! Coefficients take one slot each for the scalar mapper and three for the
//! vector mapper. Only the coefficients superpose: functors written into the
//! same slots must share their origin and frequencies. `write_vector` adds
//! raw coefficient deltas and leaves the overwritten slots alone.

use crate::error::{StateError, StateResult};
use crate::functor::{Harmonic, HarmonicScalar, HarmonicVector};
use crate::mapper::{AccumulatingMapper, OverwritingMapper, StateMapper, VectorMapper};
use crate::scalar::DurationMapper;
use crate::vector::{Vector1Mapper, Vector3Mapper};
use eg_core::StateVector;
use eg_core::units::Duration;
use nalgebra::{Vector1, Vector3, Vector5};

/// Slots spanned by a [`HarmonicVectorMapper`].
pub const HARMONIC_VECTOR_SPAN: usize = 3 + 5 * 3;

/// Slots spanned by a [`HarmonicScalarMapper`].
pub const HARMONIC_SCALAR_SPAN: usize = 3 + 5;

const ANGULAR_FREQUENCY_SLOT: usize = 0;
const DECAY_RATE_SLOT: usize = 1;
const TIME_ORIGIN_SLOT: usize = 2;
const COEFFICIENTS_SLOT: usize = 3;

fn ensure_span(base: usize, span: usize) -> StateResult<()> {
    match base.checked_add(span) {
        Some(_) => Ok(()),
        None => Err(StateError::InvalidConfig {
            what: "harmonic mapper slots run past the last index",
        }),
    }
}

/// Maps a [`HarmonicVector`] onto 18 contiguous slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarmonicVectorMapper {
    base: usize,
    time_origin: DurationMapper,
    /// constant, linear, quadratic, cosine, sine
    coefficients: [Vector3Mapper; 5],
}

impl HarmonicVectorMapper {
    /// Create a mapper at `base` whose time origin is stored in units of
    /// `time_scale`.
    ///
    /// # Errors
    /// Returns error if `time_scale` is zero or non-finite, or if the 18
    /// slots do not fit below `usize::MAX`.
    pub fn new(base: usize, time_scale: Duration) -> StateResult<Self> {
        ensure_span(base, HARMONIC_VECTOR_SPAN)?;
        let time_origin = DurationMapper::new(base + TIME_ORIGIN_SLOT, time_scale)?;
        let coefficients =
            std::array::from_fn(|k| Vector3Mapper::new(base + COEFFICIENTS_SLOT + 3 * k));
        Ok(Self {
            base,
            time_origin,
            coefficients,
        })
    }

    pub fn base(&self) -> usize {
        self.base
    }
}

impl StateMapper for HarmonicVectorMapper {
    type Object = HarmonicVector;

    fn name(&self) -> &'static str {
        "harmonic vector mapper"
    }

    fn min_dimension(&self) -> usize {
        self.base + HARMONIC_VECTOR_SPAN
    }

    fn read(&self, state: &StateVector) -> StateResult<HarmonicVector> {
        self.ensure_fits(state)?;
        let [constant, linear, quadratic, cosine, sine] = self.coefficients;
        Ok(Harmonic {
            time_origin: self.time_origin.read(state)?,
            angular_frequency: state[self.base + ANGULAR_FREQUENCY_SLOT],
            decay_rate: state[self.base + DECAY_RATE_SLOT],
            constant: constant.read(state)?,
            linear: linear.read(state)?,
            quadratic: quadratic.read(state)?,
            cosine: cosine.read(state)?,
            sine: sine.read(state)?,
        })
    }
}

impl AccumulatingMapper for HarmonicVectorMapper {
    fn write(&self, buffer: &mut StateVector, object: &HarmonicVector) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        buffer[self.base + ANGULAR_FREQUENCY_SLOT] = object.angular_frequency;
        buffer[self.base + DECAY_RATE_SLOT] = object.decay_rate;
        self.time_origin.write(buffer, &object.time_origin)?;
        self.write_vector(
            buffer,
            &[
                object.constant,
                object.linear,
                object.quadratic,
                object.cosine,
                object.sine,
            ],
        )
    }
}

impl VectorMapper for HarmonicVectorMapper {
    /// Coefficient vectors: constant, linear, quadratic, cosine, sine.
    type Vector = [Vector3<f64>; 5];

    fn write_vector(
        &self,
        buffer: &mut StateVector,
        vector: &[Vector3<f64>; 5],
    ) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        for (mapper, value) in self.coefficients.iter().zip(vector.iter()) {
            mapper.write(buffer, value)?;
        }
        Ok(())
    }
}

/// Maps a [`HarmonicScalar`] onto 8 contiguous slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarmonicScalarMapper {
    base: usize,
    time_origin: DurationMapper,
    coefficients: [Vector1Mapper; 5],
}

impl HarmonicScalarMapper {
    /// # Errors
    /// Returns error if `time_scale` is zero or non-finite, or if the 8
    /// slots do not fit below `usize::MAX`.
    pub fn new(base: usize, time_scale: Duration) -> StateResult<Self> {
        ensure_span(base, HARMONIC_SCALAR_SPAN)?;
        let time_origin = DurationMapper::new(base + TIME_ORIGIN_SLOT, time_scale)?;
        let coefficients =
            std::array::from_fn(|k| Vector1Mapper::new(base + COEFFICIENTS_SLOT + k));
        Ok(Self {
            base,
            time_origin,
            coefficients,
        })
    }

    pub fn base(&self) -> usize {
        self.base
    }
}

impl StateMapper for HarmonicScalarMapper {
    type Object = HarmonicScalar;

    fn name(&self) -> &'static str {
        "harmonic scalar mapper"
    }

    fn min_dimension(&self) -> usize {
        self.base + HARMONIC_SCALAR_SPAN
    }

    fn read(&self, state: &StateVector) -> StateResult<HarmonicScalar> {
        self.ensure_fits(state)?;
        let [constant, linear, quadratic, cosine, sine] = self.coefficients;
        Ok(Harmonic {
            time_origin: self.time_origin.read(state)?,
            angular_frequency: state[self.base + ANGULAR_FREQUENCY_SLOT],
            decay_rate: state[self.base + DECAY_RATE_SLOT],
            constant: constant.read(state)?.x,
            linear: linear.read(state)?.x,
            quadratic: quadratic.read(state)?.x,
            cosine: cosine.read(state)?.x,
            sine: sine.read(state)?.x,
        })
    }
}

impl AccumulatingMapper for HarmonicScalarMapper {
    fn write(&self, buffer: &mut StateVector, object: &HarmonicScalar) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        buffer[self.base + ANGULAR_FREQUENCY_SLOT] = object.angular_frequency;
        buffer[self.base + DECAY_RATE_SLOT] = object.decay_rate;
        self.time_origin.write(buffer, &object.time_origin)?;
        self.write_vector(
            buffer,
            &Vector5::new(
                object.constant,
                object.linear,
                object.quadratic,
                object.cosine,
                object.sine,
            ),
        )
    }
}

impl VectorMapper for HarmonicScalarMapper {
    /// Coefficients: constant, linear, quadratic, cosine, sine.
    type Vector = Vector5<f64>;

    fn write_vector(&self, buffer: &mut StateVector, vector: &Vector5<f64>) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        for (mapper, value) in self.coefficients.iter().zip(vector.iter()) {
            mapper.write(buffer, &Vector1::new(*value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eg_core::units::s;
    use eg_core::zero_state;
    use nalgebra::Vector3;

    fn sample_vector() -> HarmonicVector {
        Harmonic {
            time_origin: s(2.5),
            angular_frequency: 4.0,
            decay_rate: 0.1,
            constant: Vector3::new(1.0, 2.0, 3.0),
            linear: Vector3::new(-1.0, 0.0, 0.5),
            quadratic: Vector3::new(0.0, 0.25, 0.0),
            cosine: Vector3::new(2.0, -2.0, 1.0),
            sine: Vector3::new(0.0, 0.0, -3.0),
        }
    }

    #[test]
    fn vector_span_and_minimum_dimension() {
        let mapper = HarmonicVectorMapper::new(5, s(1.0)).unwrap();
        assert_eq!(HARMONIC_VECTOR_SPAN, 18);
        assert_eq!(mapper.min_dimension(), 23);
        assert!(mapper.read(&zero_state(22)).is_err());
    }

    #[test]
    fn vector_round_trip() {
        let mapper = HarmonicVectorMapper::new(1, s(0.5)).unwrap();
        let mut x = zero_state(1 + HARMONIC_VECTOR_SPAN);
        let f = sample_vector();
        mapper.write(&mut x, &f).unwrap();
        assert_eq!(x[0], 0.0);
        assert_eq!(x[1], 4.0);
        assert_eq!(x[2], 0.1);
        assert_eq!(x[3], 5.0);
        let back = mapper.read(&x).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn vector_coefficients_superpose() {
        let mapper = HarmonicVectorMapper::new(0, s(1.0)).unwrap();
        let a = sample_vector();
        let mut b = sample_vector();
        b.constant = Vector3::new(10.0, 0.0, 0.0);
        b.sine = Vector3::new(0.0, 1.0, 0.0);

        let mut x = zero_state(HARMONIC_VECTOR_SPAN);
        mapper.write(&mut x, &a).unwrap();
        mapper.write(&mut x, &b).unwrap();

        assert_eq!(mapper.read(&x).unwrap(), a.superpose(&b).unwrap());
    }

    #[test]
    fn scalar_round_trip_and_layout() {
        let mapper = HarmonicScalarMapper::new(0, s(1.0)).unwrap();
        let f = HarmonicScalar {
            time_origin: s(-1.0),
            angular_frequency: 2.0,
            decay_rate: 0.5,
            constant: 1.0,
            linear: 2.0,
            quadratic: 3.0,
            cosine: 4.0,
            sine: 5.0,
        };
        let mut x = zero_state(HARMONIC_SCALAR_SPAN);
        mapper.write(&mut x, &f).unwrap();
        assert_eq!(x.as_slice(), &[2.0, 0.5, -1.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(mapper.read(&x).unwrap(), f);
    }

    #[test]
    fn vector_write_vector_adds_coefficients_only() {
        let mapper = HarmonicVectorMapper::new(0, s(1.0)).unwrap();
        let f = sample_vector();
        let mut x = zero_state(HARMONIC_VECTOR_SPAN);
        mapper.write(&mut x, &f).unwrap();

        let mut delta = [Vector3::zeros(); 5];
        delta[0] = Vector3::new(-1.0, -2.0, -3.0);
        delta[4] = Vector3::new(0.5, 0.0, 0.0);
        mapper.write_vector(&mut x, &delta).unwrap();

        let back = mapper.read(&x).unwrap();
        assert_eq!(back.constant, Vector3::zeros());
        assert_eq!(back.sine, Vector3::new(0.5, 0.0, -3.0));
        assert_eq!(back.linear, f.linear);
        assert_eq!(back.angular_frequency, f.angular_frequency);
        assert_eq!(back.time_origin, f.time_origin);
    }

    #[test]
    fn scalar_write_vector_adds_coefficients_only() {
        let mapper = HarmonicScalarMapper::new(1, s(1.0)).unwrap();
        let mut x = StateVector::from_element(1 + HARMONIC_SCALAR_SPAN, 1.0);
        mapper
            .write_vector(&mut x, &Vector5::new(1.0, 2.0, 3.0, 4.0, 5.0))
            .unwrap();
        assert_eq!(x.as_slice(), &[1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(mapper.write_vector(&mut zero_state(8), &Vector5::zeros()).is_err());
    }

    #[test]
    fn rejects_slots_past_the_last_index() {
        assert_eq!(
            HarmonicVectorMapper::new(usize::MAX - 1, s(1.0)),
            Err(StateError::InvalidConfig {
                what: "harmonic mapper slots run past the last index"
            })
        );
        assert!(HarmonicVectorMapper::new(usize::MAX - HARMONIC_VECTOR_SPAN, s(1.0)).is_ok());
        assert!(HarmonicScalarMapper::new(usize::MAX - 3, s(1.0)).is_err());
    }

    #[test]
    fn rejects_zero_time_scale() {
        assert!(HarmonicVectorMapper::new(0, s(0.0)).is_err());
        assert!(HarmonicScalarMapper::new(0, s(0.0)).is_err());
    }
}
