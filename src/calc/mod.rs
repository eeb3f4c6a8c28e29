//! Pure calculation functions.
//!
//! Everything here assumes validated input: no I/O, no shared state. The only
//! table-driven piece is [`units::UnitRegistry`], which callers build once and
//! pass in explicitly.

pub mod bmi;
pub mod finance;
pub mod math;
pub mod units;

pub use bmi::{BmiCategory, BmiResult, calculate_bmi, categorize};
pub use finance::{CompoundInterest, LoanPayment, Vat, compound_interest, loan_payment, vat};
pub use units::{UnitError, UnitRegistry, UnitType, convert_unit};

/// Rounds half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    // magnitudes this large have no fractional digits left to round
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(1.005_000_1, 2), 1.01);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(22.046_226_218_5, 6), 22.046_226);
        assert_eq!(round_to(166.666_666, 2), 166.67);
    }

    #[test]
    fn huge_values_pass_through() {
        assert_eq!(round_to(1e307, 6), 1e307);
        assert_eq!(round_to(-1.5e306, 2), -1.5e306);
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
        assert!(round_to(f64::NAN, 2).is_nan());
    }
}
