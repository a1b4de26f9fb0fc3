//! Yearly output records for projections

use serde::{Deserialize, Serialize};

use super::ratio::Ratio;

/// A single row of projection output for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    /// Projection year (1-indexed)
    pub year: u32,

    // Rental income
    pub gross_rent: f64,
    pub vacancy_loss: f64,
    pub effective_gross_income: f64,

    // Operating expenses
    pub property_taxes: f64,
    pub insurance: f64,
    pub owner_paid_utilities: f64,
    pub property_management: f64,
    pub maintenance: f64,
    pub total_operating_expenses: f64,
    pub noi: f64,

    // Debt service
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub loan_payments: f64,
    pub mortgage_balance: f64,

    // Equity and sale
    pub property_value: f64,
    pub appreciation_amount: f64,
    pub equity: f64,
    pub selling_cost: f64,
    pub sale_proceeds: f64,

    // Cash flow and income tax
    pub cash_flow_before_tax: f64,
    pub depreciation: f64,
    pub cumulative_depreciation: f64,
    pub taxable_income: f64,
    pub income_tax_due: f64,
    pub cumulative_income_tax: f64,
    pub cash_flow_after_tax: f64,

    // Cost basis and sale taxes
    pub original_cost_basis: f64,
    pub adjusted_cost_basis: f64,
    pub capital_gain: f64,
    pub capital_gains_tax: f64,
    pub recapture_tax: f64,
    pub total_taxes_due_from_sale: f64,

    // Profit
    pub total_profit_pre_tax: f64,
    pub total_profit_post_tax: f64,

    // Returns and ratios
    pub cap_rate: Ratio,
    pub cash_on_cash_return: Ratio,
    pub return_on_equity: Ratio,
    pub roi_pre_tax: Ratio,
    /// `None` when the series has no rate of return
    pub irr_before_tax: Option<f64>,
    pub irr_after_tax: Option<f64>,
    pub rent_to_value: Ratio,
    pub gross_rent_multiplier: Ratio,
    pub equity_multiple: Ratio,
    pub break_even_ratio: Ratio,
    pub debt_coverage_ratio: Ratio,
    pub debt_yield: Ratio,

    // Running totals
    pub cumulative_operating_income: f64,
    pub cumulative_operating_expenses: f64,
    pub cumulative_noi: f64,
    pub cumulative_cash_flow: f64,
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Yearly rows in order, year 1 first
    pub years: Vec<YearlyRecord>,

    /// Before-tax cash flow series (year 0 outlay, no sale)
    pub before_tax_flows: Vec<f64>,

    /// After-tax cash flow series (year 0 outlay, no sale)
    pub after_tax_flows: Vec<f64>,
}

impl ProjectionResult {
    pub fn new(initial_outlay: f64) -> Self {
        Self {
            years: Vec::new(),
            before_tax_flows: vec![-initial_outlay],
            after_tax_flows: vec![-initial_outlay],
        }
    }

    /// Add a yearly row
    pub fn add_row(&mut self, row: YearlyRecord) {
        self.years.push(row);
    }

    /// Row for a 1-indexed projection year
    pub fn year(&self, year: u32) -> Option<&YearlyRecord> {
        year.checked_sub(1).and_then(|i| self.years.get(i as usize))
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary::from_records(&self.years)
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_noi: f64,
    pub total_interest: f64,
    pub total_income_tax: f64,
    pub total_cash_flow: f64,
    pub final_property_value: f64,
    pub final_equity: f64,
    pub final_profit_post_tax: f64,
    pub final_irr_before_tax: Option<f64>,
    pub final_irr_after_tax: Option<f64>,
}

impl ProjectionSummary {
    pub fn from_records(years: &[YearlyRecord]) -> Self {
        let last = years.last();

        Self {
            total_years: years.len() as u32,
            total_noi: years.iter().map(|r| r.noi).sum(),
            total_interest: years.iter().map(|r| r.interest_paid).sum(),
            total_income_tax: years.iter().map(|r| r.income_tax_due).sum(),
            total_cash_flow: years.iter().map(|r| r.cash_flow_before_tax).sum(),
            final_property_value: last.map(|r| r.property_value).unwrap_or(0.0),
            final_equity: last.map(|r| r.equity).unwrap_or(0.0),
            final_profit_post_tax: last.map(|r| r.total_profit_post_tax).unwrap_or(0.0),
            final_irr_before_tax: last.and_then(|r| r.irr_before_tax),
            final_irr_after_tax: last.and_then(|r| r.irr_after_tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result() {
        let result = ProjectionResult::new(50_000.0);
        assert_eq!(result.before_tax_flows, vec![-50_000.0]);
        assert!(result.year(1).is_none());

        let summary = result.summary();
        assert_eq!(summary.total_years, 0);
        assert_eq!(summary.final_equity, 0.0);
        assert_eq!(summary.final_irr_before_tax, None);
    }
}
