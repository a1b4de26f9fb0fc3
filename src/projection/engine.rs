//! Core projection engine for yearly rental property projections

use log::debug;

use super::amortization::{AmortizationCalculator, PeriodTotals};
use super::derived::DerivedValues;
use super::irr::calculate_irr;
use super::ratio::Ratio;
use super::records::{ProjectionResult, YearlyRecord};
use super::state::ProjectionState;
use crate::inputs::{AnalysisInput, PaymentTiming};

/// Number of years in a standard projection
pub const PROJECTION_YEARS: u32 = 30;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Number of years to project
    pub projection_years: u32,

    /// When loan payments fall due within each month
    pub payment_timing: PaymentTiming,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            projection_years: PROJECTION_YEARS,
            payment_timing: PaymentTiming::EndOfPeriod,
        }
    }
}

/// Debt service figures for one projection year
#[derive(Debug, Clone, Copy, Default)]
struct LoanYear {
    interest_paid: f64,
    principal_paid: f64,
    loan_payments: f64,
    mortgage_balance: f64,
}

/// Main projection engine
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Derived aggregates for an input under this engine's payment timing
    pub fn derive(&self, input: &AnalysisInput) -> DerivedValues {
        DerivedValues::from_input(input, self.config.payment_timing)
    }

    /// Run a projection, deriving aggregates first
    pub fn project(&self, input: &AnalysisInput) -> ProjectionResult {
        let derived = self.derive(input);
        self.project_derived(input, &derived)
    }

    /// Run a projection with aggregates already derived from `input`
    pub fn project_derived(&self, input: &AnalysisInput, derived: &DerivedValues) -> ProjectionResult {
        let mut result = ProjectionResult::new(derived.total_cash_invested);
        let mut state = ProjectionState::at_purchase(derived.total_cash_invested);

        let loan = derived.loan_active.then(|| {
            AmortizationCalculator::new(
                input.loan.interest_rate,
                input.loan.total_periods(),
                derived.loan_amount,
                self.config.payment_timing,
            )
        });

        for _year in 1..=self.config.projection_years {
            state.advance_year();
            let row = self.calculate_year(input, derived, loan.as_ref(), &mut state);
            result.add_row(row);
        }

        result.before_tax_flows = state.before_tax_flows;
        result.after_tax_flows = state.after_tax_flows;
        result
    }

    /// Calculate one year and fold it into the running state
    fn calculate_year(
        &self,
        input: &AnalysisInput,
        derived: &DerivedValues,
        loan: Option<&AmortizationCalculator>,
        state: &mut ProjectionState,
    ) -> YearlyRecord {
        let year = state.year;
        let purchase = &input.purchase;
        let rates = &input.escalation;
        let expenses = &input.expenses;
        let tax = &input.tax;

        // Rental income
        let gross_rent = purchase.rent_monthly * 12.0 * escalate(rates.rent_increase, year);
        let vacancy_loss = gross_rent * expenses.vacancy_rate;
        let effective_gross_income = gross_rent - vacancy_loss;

        // Operating expenses; management and maintenance follow gross rent
        let property_taxes = expenses.property_tax_annual * escalate(rates.property_tax_increase, year);
        let insurance = expenses.insurance_monthly * 12.0 * escalate(rates.insurance_increase, year);
        let owner_paid_utilities =
            expenses.utilities_monthly() * 12.0 * escalate(rates.utility_increase, year);
        let property_management = gross_rent * expenses.management_rate;
        let maintenance = gross_rent * expenses.maintenance_rate;
        let total_operating_expenses =
            property_taxes + insurance + owner_paid_utilities + property_management + maintenance;
        let noi = effective_gross_income - total_operating_expenses;

        let debt = match loan {
            Some(calculator) => loan_year(calculator, derived, year),
            None => LoanYear::default(),
        };

        // Equity and sale
        let property_value = purchase.purchase_price * (1.0 + rates.appreciation).powi(year as i32);
        let prior_value = purchase.purchase_price * (1.0 + rates.appreciation).powi(year as i32 - 1);
        let appreciation_amount = property_value - prior_value;
        let equity = property_value - debt.mortgage_balance;
        let selling_cost = property_value * tax.selling_cost_rate;
        let sale_proceeds = property_value - debt.mortgage_balance - selling_cost;

        // Cash flow and income tax
        let cash_flow_before_tax = noi - debt.loan_payments;
        let depreciation = if year as f64 <= tax.depreciation_years {
            derived.annual_depreciation
        } else {
            0.0
        };
        let taxable_income =
            effective_gross_income - total_operating_expenses - debt.interest_paid - depreciation;
        let income_tax_due = (taxable_income * tax.income_tax_rate).max(0.0);
        let cash_flow_after_tax = cash_flow_before_tax - income_tax_due;

        state.cum_operating_income += effective_gross_income;
        state.cum_operating_expenses += total_operating_expenses;
        state.cum_noi += noi;
        state.cum_interest += debt.interest_paid;
        state.cum_principal += debt.principal_paid;
        state.cum_cash_flow += cash_flow_before_tax;
        state.cum_depreciation += depreciation;
        state.cum_income_tax += income_tax_due;

        // Cost basis and taxes on a sale this year
        let original_cost_basis = purchase.purchase_price + purchase.closing_cost;
        let adjusted_cost_basis = original_cost_basis + purchase.initial_improvements
            - state.cum_depreciation
            + selling_cost;
        let capital_gain = property_value - adjusted_cost_basis;
        let exempt = tax.capital_gains_election.is_exempt();
        let capital_gains_tax = if !exempt && capital_gain > 0.0 {
            capital_gain * tax.capital_gains_rate
        } else {
            0.0
        };
        let recapture_tax = if exempt {
            0.0
        } else {
            state.cum_depreciation * tax.recapture_rate
        };
        let total_taxes_due_from_sale = capital_gains_tax + recapture_tax;

        // Profit
        let total_profit_pre_tax =
            sale_proceeds + state.cum_cash_flow - derived.total_cash_invested;
        let total_profit_post_tax =
            total_profit_pre_tax - state.cum_income_tax - total_taxes_due_from_sale;

        // IRR over the growing series, ending in a sale this year
        state.push_flows(cash_flow_before_tax, cash_flow_after_tax);
        let irr_before_tax = calculate_irr(&state.before_tax_series_with_sale(sale_proceeds));
        let irr_after_tax = calculate_irr(
            &state.after_tax_series_with_sale(sale_proceeds - total_taxes_due_from_sale),
        );

        // Year 1 measures rent against the price paid, later years against value
        let rent_to_value_base = if year == 1 {
            purchase.purchase_price
        } else {
            property_value
        };

        debug!(
            "year {}: noi={:.2} debt={:.2} cf={:.2} balance={:.2} irr={:?}",
            year, noi, debt.loan_payments, cash_flow_before_tax, debt.mortgage_balance, irr_before_tax
        );

        YearlyRecord {
            year,
            gross_rent,
            vacancy_loss,
            effective_gross_income,
            property_taxes,
            insurance,
            owner_paid_utilities,
            property_management,
            maintenance,
            total_operating_expenses,
            noi,
            interest_paid: debt.interest_paid,
            principal_paid: debt.principal_paid,
            cumulative_interest: state.cum_interest,
            cumulative_principal: state.cum_principal,
            loan_payments: debt.loan_payments,
            mortgage_balance: debt.mortgage_balance,
            property_value,
            appreciation_amount,
            equity,
            selling_cost,
            sale_proceeds,
            cash_flow_before_tax,
            depreciation,
            cumulative_depreciation: state.cum_depreciation,
            taxable_income,
            income_tax_due,
            cumulative_income_tax: state.cum_income_tax,
            cash_flow_after_tax,
            original_cost_basis,
            adjusted_cost_basis,
            capital_gain,
            capital_gains_tax,
            recapture_tax,
            total_taxes_due_from_sale,
            total_profit_pre_tax,
            total_profit_post_tax,
            cap_rate: Ratio::of(noi, derived.acquisition_cost),
            cash_on_cash_return: Ratio::of(cash_flow_before_tax, derived.total_cash_invested),
            return_on_equity: Ratio::of(cash_flow_before_tax, equity),
            roi_pre_tax: Ratio::of(total_profit_pre_tax, derived.total_cash_invested),
            irr_before_tax,
            irr_after_tax,
            rent_to_value: Ratio::of(gross_rent / 12.0, rent_to_value_base),
            gross_rent_multiplier: Ratio::of(property_value, gross_rent),
            equity_multiple: Ratio::of(equity + state.cum_cash_flow, derived.total_cash_invested),
            break_even_ratio: Ratio::of(total_operating_expenses + debt.loan_payments, gross_rent),
            debt_coverage_ratio: Ratio::of(noi, debt.loan_payments),
            debt_yield: Ratio::of(noi, derived.loan_amount),
            cumulative_operating_income: state.cum_operating_income,
            cumulative_operating_expenses: state.cum_operating_expenses,
            cumulative_noi: state.cum_noi,
            cumulative_cash_flow: state.cum_cash_flow,
        }
    }
}

/// Compound growth factor applied in `year` (1-indexed): year 1 is unescalated
fn escalate(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powi(year as i32 - 1)
}

/// Interest, principal, payments and closing balance for one year of the loan
fn loan_year(calculator: &AmortizationCalculator, derived: &DerivedValues, year: u32) -> LoanYear {
    let start = (year - 1) * 12 + 1;
    let end = year * 12;
    let PeriodTotals { interest, principal } = calculator.totals(start, end);
    let principal_to_date = calculator.cumulative_principal(1, end);

    LoanYear {
        interest_paid: interest,
        principal_paid: principal,
        loan_payments: derived.mortgage_monthly * 12.0,
        mortgage_balance: derived.loan_amount - principal_to_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::CapitalGainsElection;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn reference_projection() -> (DerivedValues, ProjectionResult) {
        let input = AnalysisInput::reference_case();
        let engine = ProjectionEngine::new(ProjectionConfig::default());
        let derived = engine.derive(&input);
        let result = engine.project_derived(&input, &derived);
        (derived, result)
    }

    #[test]
    fn test_projection_runs() {
        let (_, result) = reference_projection();
        assert_eq!(result.years.len(), 30);
        assert_eq!(result.years[0].year, 1);
        assert_eq!(result.years[29].year, 30);
        assert_eq!(result.before_tax_flows.len(), 31);
    }

    #[test]
    fn test_year_one_matches_closed_form() {
        let (derived, result) = reference_projection();
        let y1 = &result.years[0];

        assert_relative_eq!(y1.gross_rent, 55_200.0, epsilon = 1e-9);
        assert_relative_eq!(y1.noi, 35_952.0, epsilon = 1e-9);
        assert_relative_eq!(y1.noi, derived.noi_initial, epsilon = 1e-9);
        assert_relative_eq!(y1.cap_rate.unwrap_or(0.0), 35_952.0 / 412_000.0, epsilon = 1e-12);

        let annual_debt = derived.mortgage_monthly * 12.0;
        assert_relative_eq!(y1.loan_payments, annual_debt, epsilon = 1e-9);
        assert_relative_eq!(
            y1.cash_on_cash_return.unwrap_or(0.0),
            (35_952.0 - annual_debt) / 92_000.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(y1.interest_paid, 12_697.43, epsilon = 0.01);
        assert_relative_eq!(y1.appreciation_amount, 8_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_balance_follows_cumulative_principal() {
        let (derived, result) = reference_projection();
        let calculator =
            AmortizationCalculator::new(0.04, 360, derived.loan_amount, PaymentTiming::EndOfPeriod);

        let mut prior = derived.loan_amount;
        for row in &result.years {
            let expected = derived.loan_amount - calculator.cumulative_principal(1, row.year * 12);
            assert_eq!(row.mortgage_balance, expected);
            assert!(row.mortgage_balance <= prior + 1e-9);
            prior = row.mortgage_balance;
        }
        assert_abs_diff_eq!(result.years[29].mortgage_balance, 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_cash_flow_identity() {
        let (derived, result) = reference_projection();
        for row in &result.years {
            assert_eq!(row.cash_flow_before_tax, row.noi - row.loan_payments);
            assert_eq!(row.cash_flow_after_tax, row.cash_flow_before_tax - row.income_tax_due);
        }
        let last = &result.years[29];
        assert_relative_eq!(
            last.total_profit_pre_tax,
            last.sale_proceeds + last.cumulative_cash_flow - derived.total_cash_invested,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_depreciation_freezes_after_recovery_period() {
        let (derived, result) = reference_projection();

        let mut prior = 0.0;
        for row in &result.years {
            assert!(row.cumulative_depreciation >= prior);
            assert!(row.cumulative_depreciation <= derived.depreciable_basis);
            if row.year > 27 {
                assert_eq!(row.depreciation, 0.0);
                assert_eq!(row.cumulative_depreciation, prior);
            } else {
                assert_relative_eq!(row.depreciation, derived.annual_depreciation);
            }
            prior = row.cumulative_depreciation;
        }
    }

    #[test]
    fn test_cumulative_totals_accumulate() {
        let (_, result) = reference_projection();
        let noi_sum: f64 = result.years.iter().map(|r| r.noi).sum();
        let tax_sum: f64 = result.years.iter().map(|r| r.income_tax_due).sum();
        let last = &result.years[29];
        assert_relative_eq!(last.cumulative_noi, noi_sum, epsilon = 1e-9);
        assert_relative_eq!(last.cumulative_income_tax, tax_sum, epsilon = 1e-9);
        assert_abs_diff_eq!(last.cumulative_principal, 320_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_exchange_suppresses_sale_taxes() {
        let (_, result) = reference_projection();
        for row in &result.years {
            assert_eq!(row.capital_gains_tax, 0.0);
            assert_eq!(row.recapture_tax, 0.0);
        }

        let mut input = AnalysisInput::reference_case();
        input.tax.capital_gains_election = CapitalGainsElection::PayCapitalGains;
        let taxed = ProjectionEngine::new(ProjectionConfig::default()).project(&input);
        let last = &taxed.years[29];
        assert!(last.capital_gain > 0.0);
        assert_relative_eq!(last.capital_gains_tax, last.capital_gain * 0.15, epsilon = 1e-9);
        assert_relative_eq!(last.recapture_tax, last.cumulative_depreciation * 0.25, epsilon = 1e-9);
        assert!(last.total_profit_post_tax < result.years[29].total_profit_post_tax);
    }

    #[test]
    fn test_irr_solves_each_year() {
        let (_, result) = reference_projection();
        for row in &result.years {
            let irr = row.irr_before_tax.expect("reference case has a before-tax IRR");
            let mut series = result.before_tax_flows[..=row.year as usize].to_vec();
            *series.last_mut().unwrap() += row.sale_proceeds;
            assert_abs_diff_eq!(super::super::irr::npv_at_rate(&series, irr), 0.0, epsilon = 1e-6);
            assert!(row.irr_after_tax.is_some());
        }
    }

    #[test]
    fn test_all_cash_has_no_debt() {
        let mut input = AnalysisInput::reference_case();
        input.loan.percent_down = 1.0;
        let result = ProjectionEngine::new(ProjectionConfig::default()).project(&input);

        for row in &result.years {
            assert_eq!(row.interest_paid, 0.0);
            assert_eq!(row.principal_paid, 0.0);
            assert_eq!(row.loan_payments, 0.0);
            assert_eq!(row.mortgage_balance, 0.0);
            assert_eq!(row.debt_coverage_ratio, Ratio::NotApplicable);
            assert_eq!(row.debt_yield, Ratio::NotApplicable);
        }
    }

    #[test]
    fn test_zero_cash_invested_is_not_applicable() {
        let mut input = AnalysisInput::reference_case();
        input.loan.percent_down = 0.0;
        input.purchase.closing_cost = 0.0;
        input.purchase.initial_improvements = 0.0;
        let result = ProjectionEngine::new(ProjectionConfig::default()).project(&input);

        for row in &result.years {
            assert_eq!(row.cash_on_cash_return, Ratio::NotApplicable);
            assert_eq!(row.roi_pre_tax, Ratio::NotApplicable);
            assert_eq!(row.equity_multiple, Ratio::NotApplicable);
            assert!(row.cap_rate.is_applicable());
        }
    }

    #[test]
    fn test_short_loan_keeps_annual_payment() {
        let mut input = AnalysisInput::reference_case();
        input.loan.loan_term_years = 15;
        let engine = ProjectionEngine::new(ProjectionConfig::default());
        let derived = engine.derive(&input);
        let result = engine.project_derived(&input, &derived);

        assert_abs_diff_eq!(derived.mortgage_monthly, 2367.00, epsilon = 0.01);
        assert_abs_diff_eq!(result.years[14].mortgage_balance, 0.0, epsilon = 0.01);
        for row in &result.years {
            assert_eq!(row.loan_payments, derived.mortgage_monthly * 12.0);
            assert_eq!(row.cash_flow_before_tax, row.noi - row.loan_payments);
        }
        for row in &result.years[15..] {
            assert_abs_diff_eq!(row.interest_paid, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(row.principal_paid, 0.0, epsilon = 1e-9);
            assert!(row.debt_coverage_ratio.is_applicable());
        }
    }

    #[test]
    fn test_escalation_compounds() {
        let mut input = AnalysisInput::reference_case();
        input.expenses.insurance_monthly = 100.0;
        input.expenses.water_monthly = 50.0;
        let result = ProjectionEngine::new(ProjectionConfig::default()).project(&input);

        let y10 = &result.years[9];
        let growth = 1.02_f64.powi(9);
        assert_relative_eq!(y10.gross_rent, 55_200.0 * growth, epsilon = 1e-9);
        assert_relative_eq!(y10.property_taxes, 6_000.0 * growth, epsilon = 1e-9);
        assert_relative_eq!(y10.insurance, 1_200.0 * growth, epsilon = 1e-9);
        assert_relative_eq!(y10.owner_paid_utilities, 600.0 * growth, epsilon = 1e-9);
        assert_relative_eq!(y10.property_management, y10.gross_rent * 0.10, epsilon = 1e-12);
        assert_relative_eq!(y10.property_value, 400_000.0 * 1.02_f64.powi(10), epsilon = 1e-9);
    }
}
