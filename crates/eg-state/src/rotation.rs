//! Rotation mappers.
//!
//! The minimizer moves every slot freely, so rotation slots drift off their
//! constraint surface between evaluations. Both mappers here hand back a
//! valid rotation anyway: the quaternion mapper renormalizes on read, and the
//! axis-angle object normalizes its axis when converted.

use crate::error::{StateError, StateResult};
use crate::mapper::{AccumulatingMapper, OverwritingMapper, StateMapper, VectorMapper};
use crate::quaternion::QuaternionMapper;
use crate::scalar::ScalarMapper;
use crate::vector::Vector3Mapper;
use eg_core::StateVector;
use nalgebra::{Unit, UnitQuaternion, Vector3, Vector4};
use tracing::warn;

/// Norms below this are treated as degenerate and read as the identity.
pub const DEGENERATE_NORM: f64 = 1e-12;

/// Rotation stored as a (not necessarily unit) quaternion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuaternionRotationMapper {
    quaternion: QuaternionMapper,
}

impl QuaternionRotationMapper {
    pub fn new(offset: usize) -> Self {
        Self {
            quaternion: QuaternionMapper::new(offset),
        }
    }

    /// Underlying raw quaternion mapper.
    pub fn quaternion(&self) -> &QuaternionMapper {
        &self.quaternion
    }
}

impl StateMapper for QuaternionRotationMapper {
    type Object = UnitQuaternion<f64>;

    fn name(&self) -> &'static str {
        "quaternion rotation mapper"
    }

    fn min_dimension(&self) -> usize {
        self.quaternion.min_dimension()
    }

    fn read(&self, state: &StateVector) -> StateResult<UnitQuaternion<f64>> {
        let raw = self.quaternion.read(state)?;
        match Unit::try_new(raw, DEGENERATE_NORM) {
            Some(versor) => Ok(versor),
            None => {
                warn!(
                    offset = self.quaternion.offset(),
                    norm = raw.norm(),
                    "degenerate rotation quaternion, reading identity"
                );
                Ok(UnitQuaternion::identity())
            }
        }
    }
}

impl AccumulatingMapper for QuaternionRotationMapper {
    fn write(&self, buffer: &mut StateVector, object: &UnitQuaternion<f64>) -> StateResult<()> {
        self.quaternion.write(buffer, object.quaternion())
    }
}

impl VectorMapper for QuaternionRotationMapper {
    /// Components in `[w, x, y, z]` order.
    type Vector = Vector4<f64>;

    fn write_vector(&self, buffer: &mut StateVector, vector: &Vector4<f64>) -> StateResult<()> {
        self.quaternion.write_vector(buffer, vector)
    }
}

/// Rotation as an angle about an axis.
///
/// The axis is not required to be unit length; [`AxisAngle::to_rotation`]
/// normalizes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisAngle {
    pub axis: Vector3<f64>,
    /// Radians.
    pub angle: f64,
}

impl AxisAngle {
    pub fn new(axis: Vector3<f64>, angle: f64) -> Self {
        Self { axis, angle }
    }

    /// Axis-angle form of a rotation. The identity maps to angle 0 about x.
    pub fn from_rotation(rotation: &UnitQuaternion<f64>) -> Self {
        match rotation.axis_angle() {
            Some((axis, angle)) => Self {
                axis: axis.into_inner(),
                angle,
            },
            None => Self {
                axis: Vector3::x(),
                angle: 0.0,
            },
        }
    }

    /// Rotation represented by this axis and angle.
    ///
    /// A degenerate axis yields the identity.
    pub fn to_rotation(&self) -> UnitQuaternion<f64> {
        match Unit::try_new(self.axis, DEGENERATE_NORM) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, self.angle),
            None => {
                warn!(angle = self.angle, "degenerate rotation axis, using identity");
                UnitQuaternion::identity()
            }
        }
    }
}

/// Rotation stored as one angle slot plus a three-slot axis.
///
/// The angle slot is overwritten on write while the axis accumulates, so
/// rotations superposed through this mapper must share their angle.
/// `write_vector` adds a raw axis delta and leaves the angle alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisAngleRotationMapper {
    angle: ScalarMapper,
    axis: Vector3Mapper,
}

impl AxisAngleRotationMapper {
    /// Create an axis-angle mapper.
    ///
    /// # Errors
    /// Returns error if the angle slot falls inside the axis slots, or if the
    /// axis slots run past `usize::MAX`.
    pub fn new(angle_index: usize, axis_offset: usize) -> StateResult<Self> {
        if axis_offset.checked_add(3).is_none() {
            return Err(StateError::InvalidConfig {
                what: "axis-angle mapper axis slots run past the last index",
            });
        }
        let axis = Vector3Mapper::new(axis_offset);
        if axis.indices().contains(&angle_index) {
            return Err(StateError::InvalidConfig {
                what: "axis-angle mapper angle slot overlaps its axis slots",
            });
        }
        Ok(Self {
            angle: ScalarMapper::new(angle_index),
            axis,
        })
    }

    pub fn angle(&self) -> &ScalarMapper {
        &self.angle
    }

    pub fn axis(&self) -> &Vector3Mapper {
        &self.axis
    }
}

impl StateMapper for AxisAngleRotationMapper {
    type Object = AxisAngle;

    fn name(&self) -> &'static str {
        "axis-angle rotation mapper"
    }

    fn min_dimension(&self) -> usize {
        self.angle.min_dimension().max(self.axis.min_dimension())
    }

    fn read(&self, state: &StateVector) -> StateResult<AxisAngle> {
        self.ensure_fits(state)?;
        Ok(AxisAngle {
            axis: self.axis.read(state)?,
            angle: self.angle.read(state)?,
        })
    }
}

impl AccumulatingMapper for AxisAngleRotationMapper {
    fn write(&self, buffer: &mut StateVector, object: &AxisAngle) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        self.angle.write(buffer, &object.angle)?;
        self.axis.write(buffer, &object.axis)
    }
}

impl VectorMapper for AxisAngleRotationMapper {
    /// Axis components.
    type Vector = Vector3<f64>;

    fn write_vector(&self, buffer: &mut StateVector, vector: &Vector3<f64>) -> StateResult<()> {
        self.ensure_fits(buffer)?;
        self.axis.write_vector(buffer, vector)
    }
}
