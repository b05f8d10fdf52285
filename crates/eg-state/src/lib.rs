//! Object↔state mappers.
//!
//! A mapper is an immutable converter between a physical quantity and a
//! slice of the flat [`StateVector`](eg_core::StateVector). Mappers hold
//! only index offsets (and, for durations, a time scale); they never own or
//! resize a state vector.
//!
//! Two write behaviors exist and are kept apart by trait:
//! - [`OverwritingMapper`]: scalar-like slots (plain scalars, durations)
//!   replace whatever the buffer held.
//! - [`AccumulatingMapper`]: vector-like slots (1-D/3-D vectors, quaternions
//!   and anything built from them) add into the buffer, so several
//!   contributions can be projected onto the same slots of a zeroed vector.
//!
//! Higher-level mappers are built by delegating to lower-level ones at
//! sub-offsets: rotations wrap a quaternion or an angle + axis pair, and the
//! harmonic mappers wrap a duration mapper plus five coefficient mappers.

pub mod error;
pub mod functor;
pub mod harmonic;
pub mod mapper;
pub mod quaternion;
pub mod rotation;
pub mod scalar;
pub mod vector;

pub use error::{StateError, StateResult};
pub use functor::{ConstantFunctor, Harmonic, HarmonicScalar, HarmonicVector};
pub use harmonic::{
    HARMONIC_SCALAR_SPAN, HARMONIC_VECTOR_SPAN, HarmonicScalarMapper, HarmonicVectorMapper,
};
pub use mapper::{AccumulatingMapper, OverwritingMapper, StateMapper, VectorMapper};
pub use quaternion::{QuaternionMapper, quaternion_components};
pub use rotation::{AxisAngle, AxisAngleRotationMapper, DEGENERATE_NORM, QuaternionRotationMapper};
pub use scalar::{DurationMapper, ScalarMapper};
pub use vector::{Vector1Mapper, Vector3Mapper};
