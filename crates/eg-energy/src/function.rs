//! Composite error function handed to the minimizer.

use crate::error::{EnergyError, EnergyResult};
use crate::term::{ErrorTerm, ensure_term_fits, validate_time_step};
use eg_core::units::Time;
use eg_core::{StateVector, zero_state};
use eg_solver::{DifferentiableFunction, SolverResult};
use rayon::prelude::*;
use tracing::debug;

/// Term count at which evaluation fans out across threads.
pub const PARALLEL_TERM_THRESHOLD: usize = 8;

/// Terms summed sequentially per parallel task. Chunk partial sums are
/// merged in term order, so the result does not depend on scheduling.
const PARALLEL_CHUNK_TERMS: usize = 4;

/// Energy of a single term, for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct TermEnergy<'a> {
    pub name: &'a str,
    pub energy: f64,
}

/// Sum of error terms over one step from a fixed previous state.
///
/// Holds only borrowed, immutable inputs, so it can be evaluated any number
/// of times, from any number of threads.
#[derive(Clone, Copy)]
pub struct ErrorFunction<'a> {
    previous: &'a StateVector,
    dt: f64,
    terms: &'a [Box<dyn ErrorTerm>],
    parallel_threshold: usize,
}

impl<'a> ErrorFunction<'a> {
    /// Bind `terms` to the step from `previous` of length `dt`.
    ///
    /// # Errors
    /// Returns error if `dt` is not positive and finite, or any term
    /// reads a slot beyond `previous.len()`.
    pub fn new(
        previous: &'a StateVector,
        dt: Time,
        terms: &'a [Box<dyn ErrorTerm>],
    ) -> EnergyResult<Self> {
        let dt = validate_time_step(dt.value)?;
        for term in terms {
            ensure_term_fits(term.as_ref(), previous.len())?;
        }
        Ok(Self {
            previous,
            dt,
            terms,
            parallel_threshold: PARALLEL_TERM_THRESHOLD,
        })
    }

    /// Override the term count at which evaluation goes parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// State dimension N.
    pub fn dimension(&self) -> usize {
        self.previous.len()
    }

    pub fn previous(&self) -> &'a StateVector {
        self.previous
    }

    pub fn terms(&self) -> &'a [Box<dyn ErrorTerm>] {
        self.terms
    }

    /// Step length in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Total energy and its gradient at `candidate`.
    pub fn evaluate(&self, candidate: &StateVector) -> EnergyResult<(f64, StateVector)> {
        self.check_candidate(candidate)?;
        let n = self.dimension();

        let (energy, gradient) = if self.terms.len() >= self.parallel_threshold {
            let partials: Vec<(f64, StateVector)> = self
                .terms
                .par_chunks(PARALLEL_CHUNK_TERMS)
                .map(|chunk| self.accumulate_sequential(chunk, candidate))
                .collect();
            let mut gradient = zero_state(n);
            let mut energy = 0.0;
            for (e, g) in &partials {
                energy += e;
                gradient += g;
            }
            (energy, gradient)
        } else {
            self.accumulate_sequential(self.terms, candidate)
        };

        debug!(energy, terms = self.terms.len(), "evaluated error function");
        Ok((energy, gradient))
    }

    /// Total energy at `candidate`, skipping the returned gradient.
    pub fn energy_only(&self, candidate: &StateVector) -> EnergyResult<f64> {
        Ok(self.breakdown(candidate)?.iter().map(|t| t.energy).sum())
    }

    /// Per-term energies at `candidate`, in term order.
    pub fn breakdown(&self, candidate: &StateVector) -> EnergyResult<Vec<TermEnergy<'a>>> {
        self.check_candidate(candidate)?;
        let mut scratch = zero_state(self.dimension());
        Ok(self
            .terms
            .iter()
            .map(|term| TermEnergy {
                name: term.name(),
                energy: term.accumulate(&mut scratch, self.previous, candidate, self.dt),
            })
            .collect())
    }

    fn accumulate_sequential(
        &self,
        terms: &[Box<dyn ErrorTerm>],
        candidate: &StateVector,
    ) -> (f64, StateVector) {
        let mut gradient = zero_state(self.dimension());
        let energy: f64 = terms
            .iter()
            .map(|term| term.accumulate(&mut gradient, self.previous, candidate, self.dt))
            .sum();
        (energy, gradient)
    }

    fn check_candidate(&self, candidate: &StateVector) -> EnergyResult<()> {
        if candidate.len() != self.dimension() {
            return Err(EnergyError::DimensionMismatch {
                what: "candidate state",
                expected: self.dimension(),
                actual: candidate.len(),
            });
        }
        Ok(())
    }
}

impl DifferentiableFunction for ErrorFunction<'_> {
    fn dimension(&self) -> usize {
        ErrorFunction::dimension(self)
    }

    fn value_and_gradient(&self, x: &StateVector) -> SolverResult<(f64, StateVector)> {
        Ok(self.evaluate(x)?)
    }

    fn value(&self, x: &StateVector) -> SolverResult<f64> {
        Ok(self.energy_only(x)?)
    }
}
