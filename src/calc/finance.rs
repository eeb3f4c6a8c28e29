//! VAT, compound interest and loan amortization.
//!
//! Rates are percentages (`23.0` means 23%). Monetary outputs are rounded to
//! two decimal places only once, on the final result.

use super::round_to;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vat {
    pub vat_amount: f64,
    pub net_amount: f64,
    pub gross_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundInterest {
    pub final_amount: f64,
    pub interest_earned: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanPayment {
    pub payment_amount: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

/// Adds VAT to a net `amount`, or extracts it from a gross one when
/// `inclusive` is set.
pub fn vat(amount: f64, rate: f64, inclusive: bool) -> Vat {
    let (vat_amount, net_amount, gross_amount) = if inclusive {
        let net = amount / (1.0 + rate / 100.0);
        (amount - net, net, amount)
    } else {
        let vat = amount * (rate / 100.0);
        (vat, amount, amount + vat)
    };

    Vat {
        vat_amount: round_to(vat_amount, 2),
        net_amount: round_to(net_amount, 2),
        gross_amount: round_to(gross_amount, 2),
    }
}

/// `A = P * (1 + r/n)^(n*t)` with discrete compounding `n` times a year.
pub fn compound_interest(
    principal: f64,
    rate: f64,
    years: f64,
    compound_frequency: u32,
) -> CompoundInterest {
    let n = f64::from(compound_frequency);
    let base = 1.0 + (rate / 100.0) / n;
    let final_amount = principal * base.powf(n * years);

    CompoundInterest {
        final_amount: round_to(final_amount, 2),
        interest_earned: round_to(final_amount - principal, 2),
    }
}

/// Periodic payment of an amortized loan: `M = P * r(1+r)^n / ((1+r)^n - 1)`.
///
/// A zero rate would divide by zero in that formula, so it is handled
/// separately as `P / n` with no interest at all. So is a rate too small
/// to move `(1+r)^n` off 1.0 in floating point.
pub fn loan_payment(
    principal: f64,
    annual_rate: f64,
    years: f64,
    payments_per_year: u32,
) -> LoanPayment {
    let periods_per_year = f64::from(payments_per_year);
    let total_payments = years * periods_per_year;
    let r = (annual_rate / 100.0) / periods_per_year;
    let growth = (1.0 + r).powf(total_payments);

    if annual_rate == 0.0 || growth == 1.0 {
        return LoanPayment {
            payment_amount: round_to(principal / total_payments, 2),
            total_payment: round_to(principal, 2),
            total_interest: 0.0,
        };
    }

    let payment_amount = round_to(principal * (r * growth) / (growth - 1.0), 2);
    let total_payment = payment_amount * total_payments;

    LoanPayment {
        payment_amount,
        total_payment: round_to(total_payment, 2),
        total_interest: round_to(total_payment - principal, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn vat_exclusive_adds_tax() {
        let v = vat(100.0, 23.0, false);
        assert_eq!(v, Vat { vat_amount: 23.0, net_amount: 100.0, gross_amount: 123.0 });

        let v = vat(50.0, 20.0, false);
        assert_eq!(v.vat_amount, 10.0);
        assert_eq!(v.gross_amount, 60.0);
    }

    #[test]
    fn vat_round_trip_recovers_net() {
        let added = vat(100.0, 23.0, false);
        let extracted = vat(added.gross_amount, 23.0, true);
        assert!(close(extracted.vat_amount, 23.0, 1e-4));
        assert!(close(extracted.net_amount, 100.0, 1e-4));
        assert!(close(extracted.gross_amount, 123.0, 1e-4));
    }

    #[test]
    fn vat_zero_rate_is_identity() {
        let v = vat(100.0, 0.0, true);
        assert_eq!(v, Vat { vat_amount: 0.0, net_amount: 100.0, gross_amount: 100.0 });
    }

    #[test]
    fn compound_interest_known_values() {
        let monthly = compound_interest(1000.0, 5.0, 10.0, 12);
        assert_eq!(monthly.final_amount, 1647.01);
        assert_eq!(monthly.interest_earned, 647.01);

        let annual = compound_interest(5000.0, 3.0, 5.0, 1);
        assert_eq!(annual.final_amount, 5796.37);
        assert_eq!(annual.interest_earned, 796.37);
    }

    #[test]
    fn compound_interest_zero_rate_keeps_principal() {
        for (years, freq) in [(5.0, 12), (0.5, 1), (30.0, 365)] {
            let ci = compound_interest(1000.0, 0.0, years, freq);
            assert_eq!(ci.final_amount, 1000.0);
            assert_eq!(ci.interest_earned, 0.0);
        }
    }

    #[test]
    fn compound_interest_zero_time_earns_nothing() {
        let ci = compound_interest(1234.56, 7.0, 0.0, 4);
        assert_eq!(ci.final_amount, 1234.56);
        assert_eq!(ci.interest_earned, 0.0);
    }

    #[test]
    fn loan_payment_mortgage() {
        let loan = loan_payment(300_000.0, 4.5, 30.0, 12);
        assert_eq!(loan.payment_amount, 1520.06);
        assert_eq!(loan.total_payment, 547_221.6);
        assert_eq!(loan.total_interest, 247_221.6);
    }

    #[test]
    fn loan_payment_car_loan() {
        let loan = loan_payment(25_000.0, 6.0, 5.0, 12);
        assert_eq!(loan.payment_amount, 483.32);
        assert_eq!(loan.total_payment, 28_999.2);
        assert_eq!(loan.total_interest, 3_999.2);
    }

    #[test]
    fn loan_payment_zero_rate_has_no_interest() {
        let loan = loan_payment(10_000.0, 0.0, 5.0, 12);
        assert_eq!(loan.payment_amount, 166.67);
        assert_eq!(loan.total_payment, 10_000.0);
        assert_eq!(loan.total_interest, 0.0);
    }

    #[test]
    fn loan_payment_negligible_rate_behaves_like_zero_rate() {
        let loan = loan_payment(1000.0, 1e-20, 5.0, 12);
        assert_eq!(loan.payment_amount, 16.67);
        assert_eq!(loan.total_payment, 1000.0);
        assert_eq!(loan.total_interest, 0.0);
    }

    #[test]
    fn huge_inputs_overflow_to_infinity() {
        assert!(compound_interest(1000.0, 5.0, 1e6, 12).final_amount.is_infinite());
        assert!(loan_payment(1e308, 50.0, 100.0, 12).total_payment.is_infinite());
    }
}
