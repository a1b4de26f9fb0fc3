//! Aggregates derived once from the inputs before the yearly loop

use serde::{Deserialize, Serialize};

use super::amortization::AmortizationCalculator;
use super::ratio::Ratio;
use crate::inputs::{AnalysisInput, PaymentTiming};

/// Acquisition, financing and year-1 operating figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedValues {
    pub down_payment: f64,
    pub loan_amount: f64,
    /// Whether a loan is amortized at all (some financing at a positive rate)
    pub loan_active: bool,
    /// Fixed monthly payment, zero without an active loan
    pub mortgage_monthly: f64,

    pub property_tax_monthly: f64,
    pub insurance_monthly: f64,
    pub owner_paid_utilities_monthly: f64,
    pub management_monthly: f64,
    pub maintenance_monthly: f64,

    /// Down payment + improvements + closing cost
    pub total_cash_invested: f64,
    /// Purchase price + improvements + closing cost (cap rate denominator)
    pub acquisition_cost: f64,

    pub gross_rent_initial: f64,
    pub vacancy_loss_initial: f64,
    pub egi_initial: f64,
    pub op_exp_initial: f64,
    pub noi_initial: f64,
    pub initial_cap_rate: Ratio,
    /// Year-1 operating expenses over effective gross income
    pub operating_expense_ratio: Ratio,

    pub after_repair_value: f64,
    pub price_per_sqft: Ratio,
    pub arv_per_sqft: Ratio,
    pub land_value: f64,

    /// Improved share of price + improvements + closing cost
    pub depreciable_basis: f64,
    pub annual_depreciation: f64,
}

impl DerivedValues {
    pub fn from_input(input: &AnalysisInput, timing: PaymentTiming) -> Self {
        let purchase = &input.purchase;
        let loan = &input.loan;
        let expenses = &input.expenses;
        let tax = &input.tax;

        let down_payment = purchase.purchase_price * loan.percent_down;
        let loan_amount = purchase.purchase_price - down_payment;
        let loan_active = loan.percent_down < 1.0
            && loan.interest_rate > 0.0
            && loan.loan_term_years > 0
            && loan_amount > 0.0;
        let mortgage_monthly = if loan_active {
            AmortizationCalculator::new(loan.interest_rate, loan.total_periods(), loan_amount, timing)
                .payment()
        } else {
            0.0
        };

        let total_cash_invested =
            down_payment + purchase.initial_improvements + purchase.closing_cost;
        let acquisition_cost =
            purchase.purchase_price + purchase.initial_improvements + purchase.closing_cost;

        let gross_rent_initial = purchase.rent_monthly * 12.0;
        let vacancy_loss_initial = gross_rent_initial * expenses.vacancy_rate;
        let egi_initial = gross_rent_initial - vacancy_loss_initial;
        let op_exp_initial = expenses.property_tax_annual
            + expenses.insurance_monthly * 12.0
            + expenses.utilities_monthly() * 12.0
            + gross_rent_initial * expenses.management_rate
            + gross_rent_initial * expenses.maintenance_rate;
        let noi_initial = egi_initial - op_exp_initial;

        let after_repair_value = purchase.purchase_price + purchase.initial_improvements;
        let depreciable_basis = tax.improved_value_ratio * purchase.purchase_price
            + purchase.initial_improvements
            + purchase.closing_cost;

        Self {
            down_payment,
            loan_amount,
            loan_active,
            mortgage_monthly,
            property_tax_monthly: expenses.property_tax_annual / 12.0,
            insurance_monthly: expenses.insurance_monthly,
            owner_paid_utilities_monthly: expenses.utilities_monthly(),
            management_monthly: purchase.rent_monthly * expenses.management_rate,
            maintenance_monthly: purchase.rent_monthly * expenses.maintenance_rate,
            total_cash_invested,
            acquisition_cost,
            gross_rent_initial,
            vacancy_loss_initial,
            egi_initial,
            op_exp_initial,
            noi_initial,
            initial_cap_rate: Ratio::of(noi_initial, acquisition_cost),
            operating_expense_ratio: Ratio::of(op_exp_initial, egi_initial),
            after_repair_value,
            price_per_sqft: Ratio::of(purchase.purchase_price, input.property.sqft),
            arv_per_sqft: Ratio::of(after_repair_value, input.property.sqft),
            land_value: purchase.purchase_price * (1.0 - tax.improved_value_ratio),
            depreciable_basis,
            annual_depreciation: Ratio::of(depreciable_basis, tax.depreciation_years).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_reference_aggregates() {
        let input = AnalysisInput::reference_case();
        let derived = DerivedValues::from_input(&input, PaymentTiming::EndOfPeriod);

        assert_relative_eq!(derived.down_payment, 80_000.0, epsilon = 1e-9);
        assert_relative_eq!(derived.loan_amount, 320_000.0, epsilon = 1e-9);
        assert!(derived.loan_active);
        assert_abs_diff_eq!(derived.mortgage_monthly, 1527.73, epsilon = 0.01);
        assert_relative_eq!(derived.total_cash_invested, 92_000.0, epsilon = 1e-9);

        assert_relative_eq!(derived.gross_rent_initial, 55_200.0, epsilon = 1e-9);
        assert_relative_eq!(derived.vacancy_loss_initial, 2_208.0, epsilon = 1e-9);
        assert_relative_eq!(derived.egi_initial, 52_992.0, epsilon = 1e-9);
        assert_relative_eq!(derived.op_exp_initial, 17_040.0, epsilon = 1e-9);
        assert_relative_eq!(derived.noi_initial, 35_952.0, epsilon = 1e-9);
        assert_relative_eq!(derived.initial_cap_rate.unwrap_or(0.0), 35_952.0 / 412_000.0, epsilon = 1e-12);

        assert_relative_eq!(derived.depreciable_basis, 0.7336 * 400_000.0 + 12_000.0, epsilon = 1e-9);
        assert_relative_eq!(derived.land_value, 400_000.0 * (1.0 - 0.7336), epsilon = 1e-9);
        assert_relative_eq!(derived.management_monthly, 460.0, epsilon = 1e-9);
        assert!(derived.price_per_sqft.is_applicable());
    }

    #[test]
    fn test_all_cash_purchase() {
        let mut input = AnalysisInput::reference_case();
        input.loan.percent_down = 1.0;
        let derived = DerivedValues::from_input(&input, PaymentTiming::EndOfPeriod);

        assert_eq!(derived.loan_amount, 0.0);
        assert!(!derived.loan_active);
        assert_eq!(derived.mortgage_monthly, 0.0);
        assert_relative_eq!(derived.total_cash_invested, 412_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_denominators() {
        let mut input = AnalysisInput::reference_case();
        input.property.sqft = 0.0;
        input.purchase.rent_monthly = 0.0;
        let derived = DerivedValues::from_input(&input, PaymentTiming::EndOfPeriod);

        assert_eq!(derived.price_per_sqft, Ratio::NotApplicable);
        assert_eq!(derived.arv_per_sqft, Ratio::NotApplicable);
        assert_eq!(derived.operating_expense_ratio, Ratio::NotApplicable);
    }
}
