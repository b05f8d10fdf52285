//! Time-varying functor value types.
//!
//! Plain immutable values consumed by the harmonic mappers. A [`Harmonic`]
//! is a quadratic polynomial plus a damped oscillation about a time origin:
//!
//! ```text
//! τ    = t − t0
//! f(t) = c0 + c1·τ + c2·τ² + e^(−λ·τ)·(a·cos(ω·τ) + b·sin(ω·τ))
//! ```
//!
//! where `ω` is the angular frequency and `λ` the decay rate, both in 1/s.

use eg_core::units::{Duration, Time};
use nalgebra::Vector3;
use std::ops::{Add, Mul};

/// Value that does not change with time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantFunctor<T> {
    pub value: T,
}

impl<T: Copy> ConstantFunctor<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self, _t: Time) -> T {
        self.value
    }
}

/// Polynomial + damped-harmonic function of time.
///
/// `C` is the coefficient type: `f64` for a scalar, `Vector3<f64>` for a
/// vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Harmonic<C> {
    /// Origin `t0` of the local time `τ`.
    pub time_origin: Duration,
    /// Angular frequency `ω` (rad/s).
    pub angular_frequency: f64,
    /// Exponential decay rate `λ` (1/s).
    pub decay_rate: f64,
    pub constant: C,
    pub linear: C,
    pub quadratic: C,
    pub cosine: C,
    pub sine: C,
}

pub type HarmonicScalar = Harmonic<f64>;
pub type HarmonicVector = Harmonic<Vector3<f64>>;

impl<C> Harmonic<C>
where
    C: Copy + Add<Output = C> + Mul<f64, Output = C>,
{
    /// Value at absolute time `t`.
    pub fn value(&self, t: Time) -> C {
        let tau = (t - self.time_origin).value;
        let (cos, sin) = self.oscillation(tau);
        self.constant
            + self.linear * tau
            + self.quadratic * (tau * tau)
            + self.cosine * cos
            + self.sine * sin
    }

    /// Time derivative at absolute time `t` (per second).
    pub fn derivative(&self, t: Time) -> C {
        let tau = (t - self.time_origin).value;
        let (cos, sin) = self.oscillation(tau);
        let (w, l) = (self.angular_frequency, self.decay_rate);
        // d/dτ [e^(−λτ)(a cos ωτ + b sin ωτ)]
        //   = e^(−λτ)((ωb − λa) cos ωτ − (ωa + λb) sin ωτ)
        self.linear
            + self.quadratic * (2.0 * tau)
            + self.cosine * (-l * cos - w * sin)
            + self.sine * (w * cos - l * sin)
    }

    /// Coefficient-wise sum of two functors sharing origin and frequencies.
    ///
    /// Returns `None` when the origins or frequencies differ, since the sum
    /// is then not expressible as a single functor.
    pub fn superpose(&self, other: &Self) -> Option<Self> {
        if self.time_origin != other.time_origin
            || self.angular_frequency != other.angular_frequency
            || self.decay_rate != other.decay_rate
        {
            return None;
        }
        Some(Self {
            time_origin: self.time_origin,
            angular_frequency: self.angular_frequency,
            decay_rate: self.decay_rate,
            constant: self.constant + other.constant,
            linear: self.linear + other.linear,
            quadratic: self.quadratic + other.quadratic,
            cosine: self.cosine + other.cosine,
            sine: self.sine + other.sine,
        })
    }

    /// Damped cosine and sine factors at local time `tau`.
    fn oscillation(&self, tau: f64) -> (f64, f64) {
        let damping = (-self.decay_rate * tau).exp();
        let (sin, cos) = (self.angular_frequency * tau).sin_cos();
        (damping * cos, damping * sin)
    }
}
