//! Fixed-rate, fully amortizing loan schedule
//!
//! Cumulative interest and principal over a period range are found by walking the
//! schedule one month at a time from period 1, the same way spreadsheet
//! CUMIPMT / CUMPRINC report them. Walking (rather than a closed form) keeps the
//! final-period clamp exact: the last payment can only retire what is left.

use crate::inputs::PaymentTiming;

/// Monthly amortization simulator for a single loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationCalculator {
    annual_rate: f64,
    total_periods: u32,
    principal: f64,
    timing: PaymentTiming,
}

/// Interest and principal accumulated over a period range
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodTotals {
    pub interest: f64,
    pub principal: f64,
}

impl AmortizationCalculator {
    pub fn new(annual_rate: f64, total_periods: u32, principal: f64, timing: PaymentTiming) -> Self {
        Self {
            annual_rate,
            total_periods,
            principal,
            timing,
        }
    }

    /// Monthly rate
    pub fn periodic_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    /// Constant periodic payment from the annuity formula.
    /// Zero rate gives a principal-only schedule.
    pub fn payment(&self) -> f64 {
        if self.total_periods == 0 || self.principal <= 0.0 {
            return 0.0;
        }
        let r = self.periodic_rate();
        let n = self.total_periods as f64;
        if r == 0.0 {
            return self.principal / n;
        }
        let ordinary = self.principal * r / (1.0 - (1.0 + r).powf(-n));
        match self.timing {
            PaymentTiming::EndOfPeriod => ordinary,
            PaymentTiming::StartOfPeriod => ordinary / (1.0 + r),
        }
    }

    /// Interest paid over periods `start..=end` (1-indexed)
    pub fn cumulative_interest(&self, start: u32, end: u32) -> f64 {
        self.totals(start, end).interest
    }

    /// Principal repaid over periods `start..=end` (1-indexed)
    pub fn cumulative_principal(&self, start: u32, end: u32) -> f64 {
        self.totals(start, end).principal
    }

    /// Interest and principal over periods `start..=end` in a single pass.
    ///
    /// Periods past the loan term contribute nothing: the balance is already zero.
    pub fn totals(&self, start: u32, end: u32) -> PeriodTotals {
        let mut totals = PeriodTotals::default();
        let start = start.max(1);
        if start > end || self.principal <= 0.0 || self.total_periods == 0 {
            return totals;
        }

        let r = self.periodic_rate();
        let payment = self.payment();
        let mut balance = self.principal;

        for period in 1..=end {
            let interest = if self.timing == PaymentTiming::StartOfPeriod && period == 1 {
                0.0
            } else {
                balance * r
            };
            // Never retire more than what is still owed
            let principal = (payment - interest).min(balance);

            if period >= start {
                totals.interest += interest;
                totals.principal += principal;
            }

            balance = (balance - principal).max(0.0);
        }

        totals
    }

    /// Outstanding balance after `period` payments
    pub fn balance_after(&self, period: u32) -> f64 {
        self.principal - self.cumulative_principal(1, period)
    }
}

/// Free-function form: cumulative interest over `start..=end`
pub fn cumulative_interest(
    annual_rate: f64,
    total_periods: u32,
    principal: f64,
    start: u32,
    end: u32,
    timing: PaymentTiming,
) -> f64 {
    AmortizationCalculator::new(annual_rate, total_periods, principal, timing).cumulative_interest(start, end)
}

/// Free-function form: cumulative principal over `start..=end`
pub fn cumulative_principal(
    annual_rate: f64,
    total_periods: u32,
    principal: f64,
    start: u32,
    end: u32,
    timing: PaymentTiming,
) -> f64 {
    AmortizationCalculator::new(annual_rate, total_periods, principal, timing).cumulative_principal(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn reference_loan() -> AmortizationCalculator {
        AmortizationCalculator::new(0.04, 360, 320_000.0, PaymentTiming::EndOfPeriod)
    }

    #[test]
    fn test_reference_payment() {
        assert_abs_diff_eq!(reference_loan().payment(), 1527.7289, epsilon = 1e-3);
    }

    #[test]
    fn test_first_year_split() {
        let loan = reference_loan();
        let year1 = loan.totals(1, 12);
        assert_abs_diff_eq!(year1.interest, 12697.43, epsilon = 0.01);
        assert_abs_diff_eq!(year1.principal, 5635.32, epsilon = 0.01);
        // Every payment is split between interest and principal
        assert_relative_eq!(year1.interest + year1.principal, loan.payment() * 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fully_amortizes() {
        let loan = reference_loan();
        assert_abs_diff_eq!(loan.cumulative_principal(1, 360), 320_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(loan.balance_after(360), 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_windows_add_up() {
        let loan = reference_loan();
        let by_year: f64 = (1..=30)
            .map(|y| loan.cumulative_principal((y - 1) * 12 + 1, y * 12))
            .sum();
        assert_relative_eq!(by_year, loan.cumulative_principal(1, 360), epsilon = 1e-9);
    }

    #[test]
    fn test_nothing_after_payoff() {
        let loan = AmortizationCalculator::new(0.05, 120, 100_000.0, PaymentTiming::EndOfPeriod);
        assert_abs_diff_eq!(loan.cumulative_principal(121, 240), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(loan.cumulative_interest(121, 240), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(loan.cumulative_principal(1, 240), 100_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_is_principal_only() {
        let loan = AmortizationCalculator::new(0.0, 120, 60_000.0, PaymentTiming::EndOfPeriod);
        assert_relative_eq!(loan.payment(), 500.0);
        assert_eq!(loan.cumulative_interest(1, 120), 0.0);
        assert_relative_eq!(loan.cumulative_principal(1, 12), 6000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(loan.balance_after(120), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_start_of_period_timing() {
        let loan = AmortizationCalculator::new(0.06, 360, 200_000.0, PaymentTiming::StartOfPeriod);
        // First payment is all principal
        assert_eq!(loan.cumulative_interest(1, 1), 0.0);
        assert_relative_eq!(loan.cumulative_principal(1, 1), loan.payment(), epsilon = 1e-12);
        assert_abs_diff_eq!(loan.balance_after(360), 0.0, epsilon = 0.01);

        let ordinary = AmortizationCalculator::new(0.06, 360, 200_000.0, PaymentTiming::EndOfPeriod);
        assert!(loan.payment() < ordinary.payment());
    }

    #[test]
    fn test_empty_ranges() {
        let loan = reference_loan();
        assert_eq!(loan.cumulative_interest(13, 12), 0.0);
        assert_eq!(
            AmortizationCalculator::new(0.04, 360, 0.0, PaymentTiming::EndOfPeriod).payment(),
            0.0
        );
        assert_eq!(
            cumulative_interest(0.04, 0, 100_000.0, 1, 12, PaymentTiming::EndOfPeriod),
            0.0
        );
        assert_relative_eq!(
            cumulative_principal(0.04, 360, 320_000.0, 1, 12, PaymentTiming::EndOfPeriod),
            loan.cumulative_principal(1, 12)
        );
    }
}
