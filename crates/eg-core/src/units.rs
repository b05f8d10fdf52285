//! SI quantities for reference scales and durations.
//!
//! Constructors take values in SI base units; terms read `.value` back out
//! as plain `f64` once the scale has been validated.

use uom::si::f64::{
    AvailableEnergy as UomAvailableEnergy, Length as UomLength, Mass as UomMass, Time as UomTime,
};

pub type Length = UomLength;
pub type Mass = UomMass;
/// Energy per unit mass (J/kg).
pub type SpecificEnergy = UomAvailableEnergy;
pub type Time = UomTime;

/// Signed time interval.
pub type Duration = UomTime;

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn j_per_kg(v: f64) -> SpecificEnergy {
    use uom::si::available_energy::joule_per_kilogram;
    SpecificEnergy::new::<joule_per_kilogram>(v)
}

pub mod constants {
    /// Standard gravity (m/s²).
    pub const G0_MPS2: f64 = 9.806_65;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_si_base_values() {
        assert_eq!(kg(3.0).value, 3.0);
        assert_eq!(s(0.25).value, 0.25);
        assert_eq!(m(-2.0).value, -2.0);
        assert_eq!(j_per_kg(7.0).value, 7.0);
    }

    #[test]
    fn non_base_units_convert_to_si() {
        use uom::si::mass::gram;
        use uom::si::time::millisecond;
        assert!((Mass::new::<gram>(250.0).value - 0.25).abs() < 1e-15);
        assert!((Time::new::<millisecond>(-5.0).value + 0.005).abs() < 1e-15);
    }
}
