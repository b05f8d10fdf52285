//! The energy-error-term trait and checks shared by every term.

use crate::error::{EnergyError, EnergyResult};
use eg_core::{StateVector, ensure_positive};

/// A differentiable, non-negative penalty for one physical law's violation
/// over a time step, in energy units.
///
/// Terms are immutable index and scale assignments. They are evaluated
/// against a fixed previous state and a varying candidate state, and only
/// ever differentiate with respect to the candidate.
pub trait ErrorTerm: Send + Sync {
    /// Term name for diagnostics and energy breakdowns.
    fn name(&self) -> &str;

    /// Smallest state length covering every index this term reads.
    fn min_dimension(&self) -> usize;

    /// Whether the term can operate on states of length `dimension`.
    fn is_valid_for_dimension(&self, dimension: usize) -> bool {
        dimension >= self.min_dimension()
    }

    /// Energy at `candidate`, adding ∂energy/∂candidate into `gradient`.
    ///
    /// Performs no validation: callers must already have checked `dt` and
    /// the lengths of all three vectors, as [`ErrorTerm::evaluate`] and
    /// [`crate::ErrorFunction`] do.
    fn accumulate(
        &self,
        gradient: &mut StateVector,
        previous: &StateVector,
        candidate: &StateVector,
        dt: f64,
    ) -> f64;

    /// Checked evaluation.
    ///
    /// Rejects a bad `dt`, mismatched vector lengths, or states too short
    /// for this term before touching `gradient`. On success the returned
    /// energy is `>= 0` and the term's partial derivatives have been added
    /// to `gradient`.
    fn evaluate(
        &self,
        gradient: &mut StateVector,
        previous: &StateVector,
        candidate: &StateVector,
        dt: f64,
    ) -> EnergyResult<f64> {
        validate_time_step(dt)?;
        if previous.len() != candidate.len() {
            return Err(EnergyError::DimensionMismatch {
                what: "previous and candidate states",
                expected: previous.len(),
                actual: candidate.len(),
            });
        }
        if gradient.len() != candidate.len() {
            return Err(EnergyError::DimensionMismatch {
                what: "gradient accumulator",
                expected: candidate.len(),
                actual: gradient.len(),
            });
        }
        ensure_term_fits(self, candidate.len())?;
        Ok(self.accumulate(gradient, previous, candidate, dt))
    }
}

/// Reject a non-positive or non-finite time step.
pub fn validate_time_step(dt: f64) -> EnergyResult<f64> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(EnergyError::InvalidTimeStep { dt })
    }
}

/// Reject a state length the term cannot operate on.
pub fn ensure_term_fits<T: ErrorTerm + ?Sized>(term: &T, dimension: usize) -> EnergyResult<()> {
    if term.is_valid_for_dimension(dimension) {
        Ok(())
    } else {
        Err(EnergyError::TermDimension {
            term: term.name().to_string(),
            required: term.min_dimension(),
            dimension,
        })
    }
}

/// SI value of a reference scale, which must be positive and finite.
pub(crate) fn reference_scale(value: f64, what: &'static str) -> EnergyResult<f64> {
    Ok(ensure_positive(value, what)?)
}

/// Reject per-dimension index lists that disagree with the spatial dimension.
pub(crate) fn ensure_spatial(
    indices: &[usize],
    spatial: usize,
    what: &'static str,
) -> EnergyResult<()> {
    if indices.len() != spatial {
        return Err(EnergyError::DimensionMismatch {
            what,
            expected: spatial,
            actual: indices.len(),
        });
    }
    Ok(())
}
