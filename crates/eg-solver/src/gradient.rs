//! Finite difference gradients.
//!
//! Used to cross-check analytic gradients of energy terms and composite
//! objectives.

use crate::error::{SolverError, SolverResult};
use crate::function::DifferentiableFunction;
use eg_core::Tolerances;
use nalgebra::DVector;

/// Compute gradient using forward finite differences.
///
/// For each component j, perturbs x[j] by epsilon and computes (f(x+e) - f(x))/epsilon.
pub fn forward_difference_gradient<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DVector<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<f64>,
{
    let n = x.len();
    let f_x = f(x)?;
    let mut grad = DVector::zeros(n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        grad[j] = (f(&x_perturbed)? - f_x) / dx;
    }

    Ok(grad)
}

/// Compute gradient using central finite differences (more accurate but 2x cost).
pub fn central_difference_gradient<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DVector<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<f64>,
{
    let n = x.len();
    let mut grad = DVector::zeros(n);

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        grad[j] = (f_plus - f_minus) / (2.0 * dx);
    }

    Ok(grad)
}

/// Outcome of comparing an analytic gradient to a central difference.
#[derive(Clone, Debug)]
pub struct GradientCheck {
    pub analytic: DVector<f64>,
    pub numeric: DVector<f64>,
    /// Largest componentwise absolute difference.
    pub max_abs_error: f64,
}

impl GradientCheck {
    /// Whether every component agrees within `abs + rel * |numeric|`.
    pub fn agrees(&self, abs: f64, rel: f64) -> bool {
        let tol = Tolerances::new(abs, rel);
        self.analytic
            .iter()
            .zip(self.numeric.iter())
            .all(|(a, n)| tol.admits(*a, *n))
    }
}

/// Compare `function`'s analytic gradient at `x` with a central difference.
pub fn check_gradient<F>(function: &F, x: &DVector<f64>, epsilon: f64) -> SolverResult<GradientCheck>
where
    F: DifferentiableFunction + ?Sized,
{
    if x.len() != function.dimension() {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "gradient check point has {} components, function expects {}",
                x.len(),
                function.dimension()
            ),
        });
    }
    let (_, analytic) = function.value_and_gradient(x)?;
    let numeric = central_difference_gradient(x, |p| function.value(p), epsilon)?;
    let max_abs_error = (&analytic - &numeric).amax();
    Ok(GradientCheck {
        analytic,
        numeric,
        max_abs_error,
    })
}
