//! Nonlinear conjugate-gradient minimizer.
//!
//! Each iteration picks a search direction from the current gradient and the
//! previous direction, then runs a line search that brackets a step meeting
//! the strong Wolfe conditions and narrows it by cubic interpolation. The
//! curvature condition is what keeps successive directions conjugate.
//! The direction falls back to steepest descent whenever it stops being a
//! descent direction, and every `n` iterations on an `n`-variable problem.

use crate::error::{SolverError, SolverResult};
use crate::function::DifferentiableFunction;
use nalgebra::DVector;
use tracing::{debug, info, warn};

/// Update formula for the conjugate-direction coefficient β.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BetaFormula {
    /// Polak–Ribière, clamped at zero (PR+).
    #[default]
    PolakRibiere,
    FletcherReeves,
}

/// Conjugate-gradient configuration.
#[derive(Clone, Debug)]
pub struct ConjugateGradientConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Stop when the gradient norm falls to this value
    pub gradient_tol: f64,
    /// Stop when the objective falls to this value, if set
    pub value_tol: Option<f64>,
    /// Length of the first trial step along the first direction
    pub initial_step: f64,
    /// Sufficient-decrease constant of the Armijo condition
    pub armijo_c1: f64,
    /// Curvature constant of the strong Wolfe condition, in `(armijo_c1, 1)`
    pub wolfe_c2: f64,
    /// Maximum function evaluations per line search
    pub max_line_search_iters: usize,
    /// Largest ratio between a first trial step and the previous step
    pub max_step_growth: f64,
    /// Restart with steepest descent every this many iterations.
    /// `None` restarts every `dimension` iterations; `Some(0)` never does.
    pub restart_every: Option<usize>,
    pub formula: BetaFormula,
}

impl Default for ConjugateGradientConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            gradient_tol: 1e-8,
            value_tol: None,
            initial_step: 1.0,
            armijo_c1: 1e-4,
            wolfe_c2: 0.1,
            max_line_search_iters: 40,
            max_step_growth: 100.0,
            restart_every: None,
            formula: BetaFormula::PolakRibiere,
        }
    }
}

impl ConjugateGradientConfig {
    /// Default configuration with the given gradient tolerance.
    pub fn with_tolerance(gradient_tol: f64) -> Self {
        Self {
            gradient_tol,
            ..Self::default()
        }
    }

    fn validate(&self) -> SolverResult<()> {
        if !(self.gradient_tol.is_finite() && self.gradient_tol >= 0.0) {
            return Err(SolverError::ProblemSetup {
                what: format!("gradient tolerance must be finite and >= 0, got {}", self.gradient_tol),
            });
        }
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(SolverError::ProblemSetup {
                what: format!("initial step must be positive, got {}", self.initial_step),
            });
        }
        if !(self.armijo_c1 > 0.0 && self.armijo_c1 < 0.5) {
            return Err(SolverError::ProblemSetup {
                what: format!("Armijo constant must lie in (0, 0.5), got {}", self.armijo_c1),
            });
        }
        if !(self.wolfe_c2 > self.armijo_c1 && self.wolfe_c2 < 1.0) {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "Wolfe curvature constant must lie in ({}, 1), got {}",
                    self.armijo_c1, self.wolfe_c2
                ),
            });
        }
        if !(self.max_step_growth >= 1.0) {
            return Err(SolverError::ProblemSetup {
                what: format!("max step growth must be >= 1, got {}", self.max_step_growth),
            });
        }
        Ok(())
    }
}

/// Minimization result.
#[derive(Clone, Debug)]
pub struct MinimizeResult {
    /// Final point
    pub x: DVector<f64>,
    /// Objective at `x`
    pub value: f64,
    /// Gradient norm at `x`
    pub gradient_norm: f64,
    /// Number of iterations taken
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

struct Step {
    alpha: f64,
    x: DVector<f64>,
    value: f64,
    gradient: DVector<f64>,
}

/// Objective and directional derivative at one trial step length.
#[derive(Clone, Copy, Debug)]
struct LinePoint {
    alpha: f64,
    value: f64,
    slope: f64,
}

/// Growth factor while bracketing.
const BRACKET_EXPANSION: f64 = 2.0;

/// Minimize `function` starting from `x0`.
///
/// Running out of iterations or stalling in the line search is not an error:
/// the best point found is returned with `converged == false`. Use
/// [`minimize_strict`] to turn that into an error.
pub fn minimize<F>(
    function: &F,
    x0: DVector<f64>,
    config: &ConjugateGradientConfig,
) -> SolverResult<MinimizeResult>
where
    F: DifferentiableFunction + ?Sized,
{
    config.validate()?;
    let n = function.dimension();
    if x0.len() != n {
        return Err(SolverError::ProblemSetup {
            what: format!("initial point has {} components, function expects {}", x0.len(), n),
        });
    }

    let mut x = x0;
    let (mut f, mut g) = function.value_and_gradient(&x)?;
    if !f.is_finite() {
        return Err(SolverError::Numeric {
            what: format!("objective is {} at the initial point", f),
        });
    }
    let mut d = -&g;
    // (alpha, slope) of the previous accepted step
    let mut previous: Option<(f64, f64)> = None;
    let restart_every = config.restart_every.unwrap_or(n);
    let mut since_restart = 0;

    for iter in 0..config.max_iterations {
        let g_norm = g.norm();
        if is_converged(f, g_norm, config) {
            info!(iterations = iter, value = f, gradient_norm = g_norm, "minimizer converged");
            return Ok(MinimizeResult {
                x,
                value: f,
                gradient_norm: g_norm,
                iterations: iter,
                converged: true,
            });
        }

        let periodic_restart = restart_every > 0 && since_restart >= restart_every;
        let mut slope = g.dot(&d);
        if periodic_restart || !(slope < 0.0) {
            d = -&g;
            slope = -g_norm * g_norm;
            previous = None;
            since_restart = 0;
        }

        let alpha0 = match previous {
            Some((alpha, prev_slope)) => {
                let guess = alpha * prev_slope / slope;
                if guess.is_finite() && guess > 0.0 {
                    guess.min(config.max_step_growth * alpha)
                } else {
                    config.initial_step / d.norm()
                }
            }
            None => config.initial_step / d.norm(),
        };

        let mut step = line_search(function, &x, f, slope, &d, alpha0, config)?;
        if step.is_none() && previous.is_some() {
            // Conjugate direction failed; retry along steepest descent.
            d = -&g;
            slope = -g_norm * g_norm;
            since_restart = 0;
            step = line_search(function, &x, f, slope, &d, config.initial_step / d.norm(), config)?;
        }

        let Some(step) = step else {
            warn!(iteration = iter, value = f, gradient_norm = g_norm, "line search stagnated");
            return Ok(MinimizeResult {
                x,
                value: f,
                gradient_norm: g_norm,
                iterations: iter,
                converged: false,
            });
        };

        debug!(
            iteration = iter,
            value = step.value,
            alpha = step.alpha,
            gradient_norm = step.gradient.norm(),
            "conjugate gradient step"
        );

        let g_dot = g.dot(&g);
        let beta = match config.formula {
            BetaFormula::PolakRibiere => (step.gradient.dot(&(&step.gradient - &g)) / g_dot).max(0.0),
            BetaFormula::FletcherReeves => step.gradient.dot(&step.gradient) / g_dot,
        };

        previous = Some((step.alpha, slope));
        x = step.x;
        f = step.value;
        g = step.gradient;
        d = -&g + beta * d;
        since_restart += 1;
    }

    let g_norm = g.norm();
    let converged = is_converged(f, g_norm, config);
    if !converged {
        warn!(
            max_iterations = config.max_iterations,
            value = f,
            gradient_norm = g_norm,
            "minimizer hit iteration limit"
        );
    }
    Ok(MinimizeResult {
        x,
        value: f,
        gradient_norm: g_norm,
        iterations: config.max_iterations,
        converged,
    })
}

/// Like [`minimize`], but a non-converged run is an error.
pub fn minimize_strict<F>(
    function: &F,
    x0: DVector<f64>,
    config: &ConjugateGradientConfig,
) -> SolverResult<MinimizeResult>
where
    F: DifferentiableFunction + ?Sized,
{
    let result = minimize(function, x0, config)?;
    if !result.converged {
        return Err(SolverError::ConvergenceFailed {
            what: format!(
                "stopped after {} iterations, value = {}, gradient norm = {}",
                result.iterations, result.value, result.gradient_norm
            ),
        });
    }
    Ok(result)
}

fn is_converged(value: f64, gradient_norm: f64, config: &ConjugateGradientConfig) -> bool {
    gradient_norm <= config.gradient_tol || config.value_tol.is_some_and(|tol| value <= tol)
}

/// Strong Wolfe line search along `d` from `x`.
///
/// Expands the trial step until it brackets an acceptable one, then zooms
/// in on the bracket. `slope` is the directional derivative at `x` and must
/// be negative. Returns `None` if no step with sufficient decrease was found.
fn line_search<F>(
    function: &F,
    x: &DVector<f64>,
    f0: f64,
    slope: f64,
    d: &DVector<f64>,
    alpha0: f64,
    config: &ConjugateGradientConfig,
) -> SolverResult<Option<Step>>
where
    F: DifferentiableFunction + ?Sized,
{
    let origin = LinePoint {
        alpha: 0.0,
        value: f0,
        slope,
    };
    let mut last = origin;
    let mut alpha = alpha0;

    for i in 0..config.max_line_search_iters {
        let (trial, step) = evaluate_along(function, x, d, alpha)?;
        if !trial.value.is_finite() {
            alpha = 0.5 * (last.alpha + alpha);
            continue;
        }
        let budget = config.max_line_search_iters - i - 1;

        if !sufficient_decrease(&origin, &trial, config)
            || (last.alpha > 0.0 && trial.value >= last.value)
        {
            return zoom(function, x, d, &origin, last, trial, budget, config);
        }
        if curvature_holds(&origin, &trial, config) {
            return Ok(Some(step));
        }
        if trial.slope >= 0.0 {
            return zoom(function, x, d, &origin, trial, last, budget, config);
        }
        last = trial;
        alpha *= BRACKET_EXPANSION;
    }

    Ok(None)
}

/// Narrow a bracket to a strong Wolfe step.
///
/// `lo` has the lowest value seen that satisfies sufficient decrease; the
/// acceptable step lies between `lo` and `hi`.
#[allow(clippy::too_many_arguments)]
fn zoom<F>(
    function: &F,
    x: &DVector<f64>,
    d: &DVector<f64>,
    origin: &LinePoint,
    mut lo: LinePoint,
    mut hi: LinePoint,
    budget: usize,
    config: &ConjugateGradientConfig,
) -> SolverResult<Option<Step>>
where
    F: DifferentiableFunction + ?Sized,
{
    for _ in 0..budget.max(1) {
        if (hi.alpha - lo.alpha).abs() <= 1e-12 * hi.alpha.abs().max(lo.alpha.abs()) {
            break;
        }
        let alpha = cubic_minimizer(&lo, &hi);
        let (trial, step) = evaluate_along(function, x, d, alpha)?;
        if !trial.value.is_finite() {
            hi = LinePoint {
                value: f64::INFINITY,
                slope: 0.0,
                ..trial
            };
            continue;
        }

        if !sufficient_decrease(origin, &trial, config) || trial.value >= lo.value {
            hi = trial;
        } else {
            if curvature_holds(origin, &trial, config) {
                return Ok(Some(step));
            }
            if trial.slope * (hi.alpha - lo.alpha) >= 0.0 {
                hi = lo;
            }
            lo = trial;
        }
    }

    // Out of budget: settle for sufficient decrease alone.
    if lo.alpha > 0.0 {
        let (_, step) = evaluate_along(function, x, d, lo.alpha)?;
        return Ok(Some(step));
    }
    Ok(None)
}

fn evaluate_along<F>(
    function: &F,
    x: &DVector<f64>,
    d: &DVector<f64>,
    alpha: f64,
) -> SolverResult<(LinePoint, Step)>
where
    F: DifferentiableFunction + ?Sized,
{
    let x_new = x + alpha * d;
    let (value, gradient) = function.value_and_gradient(&x_new)?;
    let slope = gradient.dot(d);
    Ok((
        LinePoint { alpha, value, slope },
        Step {
            alpha,
            x: x_new,
            value,
            gradient,
        },
    ))
}

fn sufficient_decrease(
    origin: &LinePoint,
    trial: &LinePoint,
    config: &ConjugateGradientConfig,
) -> bool {
    trial.value <= origin.value + config.armijo_c1 * trial.alpha * origin.slope
}

fn curvature_holds(
    origin: &LinePoint,
    trial: &LinePoint,
    config: &ConjugateGradientConfig,
) -> bool {
    trial.slope.abs() <= -config.wolfe_c2 * origin.slope
}

/// Minimizer of the cubic matching value and slope at `a` and `b`, kept
/// at least a tenth of the bracket away from either end. Falls back to
/// bisection.
fn cubic_minimizer(a: &LinePoint, b: &LinePoint) -> f64 {
    let lower = a.alpha.min(b.alpha);
    let upper = a.alpha.max(b.alpha);
    let margin = 0.1 * (upper - lower);

    let d1 = a.slope + b.slope - 3.0 * (a.value - b.value) / (a.alpha - b.alpha);
    let discriminant = d1 * d1 - a.slope * b.slope;
    if discriminant >= 0.0 {
        let d2 = discriminant.sqrt().copysign(b.alpha - a.alpha);
        let alpha = b.alpha
            - (b.alpha - a.alpha) * (b.slope + d2 - d1) / (b.slope - a.slope + 2.0 * d2);
        if alpha.is_finite() && alpha >= lower + margin && alpha <= upper - margin {
            return alpha;
        }
    }
    0.5 * (a.alpha + b.alpha)
}
