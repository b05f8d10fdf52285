//! Objective abstraction consumed by the minimizer.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;

/// Scalar function of N reals with an analytic gradient.
///
/// Implementations must be pure: evaluating at the same point twice gives
/// the same result, and evaluation has no observable side effects.
pub trait DifferentiableFunction {
    /// Number of variables N.
    fn dimension(&self) -> usize;

    /// Value and gradient at `x` (length N).
    fn value_and_gradient(&self, x: &DVector<f64>) -> SolverResult<(f64, DVector<f64>)>;

    /// Value only. Defaults to discarding the gradient.
    fn value(&self, x: &DVector<f64>) -> SolverResult<f64> {
        Ok(self.value_and_gradient(x)?.0)
    }
}

impl<T: DifferentiableFunction + ?Sized> DifferentiableFunction for &T {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn value_and_gradient(&self, x: &DVector<f64>) -> SolverResult<(f64, DVector<f64>)> {
        (**self).value_and_gradient(x)
    }

    fn value(&self, x: &DVector<f64>) -> SolverResult<f64> {
        (**self).value(x)
    }
}

/// [`DifferentiableFunction`] backed by a closure.
pub struct ClosureFunction<F> {
    dimension: usize,
    f: F,
}

/// Wrap a closure returning `(value, gradient)` as a [`DifferentiableFunction`].
pub fn from_fn<F>(dimension: usize, f: F) -> ClosureFunction<F>
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    ClosureFunction { dimension, f }
}

impl<F> DifferentiableFunction for ClosureFunction<F>
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn value_and_gradient(&self, x: &DVector<f64>) -> SolverResult<(f64, DVector<f64>)> {
        if x.len() != self.dimension {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "point has {} components, function expects {}",
                    x.len(),
                    self.dimension
                ),
            });
        }
        let (value, gradient) = (self.f)(x);
        if gradient.len() != self.dimension {
            return Err(SolverError::Evaluation {
                what: format!(
                    "gradient has {} components, expected {}",
                    gradient.len(),
                    self.dimension
                ),
            });
        }
        Ok((value, gradient))
    }
}
