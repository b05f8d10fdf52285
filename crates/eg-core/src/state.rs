//! The flat state vector shared by mappers, error terms and the minimizer.
//!
//! A state vector has no intrinsic layout. Meaning comes entirely from which
//! mappers and terms were configured against which indices.

use nalgebra::DVector;

/// Fixed-length vector of reals describing the whole system at one instant.
pub type StateVector = DVector<f64>;

/// Create a zeroed state of the given dimension.
pub fn zero_state(dimension: usize) -> StateVector {
    StateVector::zeros(dimension)
}

/// Smallest dimension that covers every index in `indices`.
///
/// Returns 0 for an empty set. Saturates at `usize::MAX`, which no state
/// can reach.
pub fn covering_dimension<I>(indices: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    indices.into_iter().map(|i| i.saturating_add(1)).max().unwrap_or(0)
}
