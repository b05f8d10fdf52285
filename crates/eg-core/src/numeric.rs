use crate::EgError;

/// Floating point type used throughout the state and energy layers.
pub type Real = f64;

/// Mixed absolute/relative acceptance band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    pub fn new(abs: Real, rel: Real) -> Self {
        Self { abs, rel }
    }

    /// `|value - reference| <= abs + rel * |reference|`
    pub fn admits(&self, value: Real, reference: Real) -> bool {
        (value - reference).abs() <= self.abs + self.rel * reference.abs()
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, EgError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EgError::NonFinite { what, value: v })
    }
}

/// Reference scales and time steps go through here.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, EgError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(EgError::NotPositive { what, value: v })
    }
}

/// Finite and non-zero; sign is free.
pub fn ensure_nonzero(v: Real, what: &'static str) -> Result<Real, EgError> {
    let v = ensure_finite(v, what)?;
    if v != 0.0 {
        Ok(v)
    } else {
        Err(EgError::Zero { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_scales_with_reference() {
        let tol = Tolerances::new(1e-6, 1e-3);
        assert!(tol.admits(1000.5, 1000.0));
        assert!(!tol.admits(1002.0, 1000.0));
        assert!(tol.admits(5e-7, 0.0));
        assert!(!tol.admits(2e-6, 0.0));
        assert!(!tol.admits(Real::NAN, 1.0));
    }

    #[test]
    fn ensure_finite_names_the_value() {
        let err = ensure_finite(Real::NAN, "mass reference").unwrap_err();
        assert!(err.to_string().starts_with("mass reference must be finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_negative_and_infinite() {
        assert_eq!(ensure_positive(2.5, "dt"), Ok(2.5));
        assert_eq!(
            ensure_positive(0.0, "dt"),
            Err(EgError::NotPositive { what: "dt", value: 0.0 })
        );
        assert!(ensure_positive(-1.0, "dt").is_err());
        assert!(matches!(
            ensure_positive(Real::INFINITY, "dt"),
            Err(EgError::NonFinite { .. })
        ));
    }

    #[test]
    fn ensure_nonzero_allows_negative() {
        assert_eq!(ensure_nonzero(-3.0, "scale"), Ok(-3.0));
        assert_eq!(ensure_nonzero(0.0, "scale"), Err(EgError::Zero { what: "scale" }));
        assert!(ensure_nonzero(Real::NAN, "scale").is_err());
    }
}
