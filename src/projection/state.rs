//! Running totals carried from one projection year to the next

/// Accumulator folded across the yearly loop.
///
/// Every field depends on all prior years, so years must be projected in order.
#[derive(Debug, Clone, Default)]
pub struct ProjectionState {
    /// Last completed projection year (0 before the first)
    pub year: u32,

    pub cum_operating_income: f64,
    pub cum_operating_expenses: f64,
    pub cum_noi: f64,
    pub cum_interest: f64,
    pub cum_principal: f64,
    pub cum_cash_flow: f64,
    pub cum_depreciation: f64,
    pub cum_income_tax: f64,

    /// Before-tax flows so far: year-0 outlay, then one entry per year
    pub before_tax_flows: Vec<f64>,

    /// After-tax flows so far: year-0 outlay, then one entry per year
    pub after_tax_flows: Vec<f64>,
}

impl ProjectionState {
    /// Initialize state at purchase, with the cash invested as the year-0 outflow
    pub fn at_purchase(total_cash_invested: f64) -> Self {
        Self {
            before_tax_flows: vec![-total_cash_invested],
            after_tax_flows: vec![-total_cash_invested],
            ..Default::default()
        }
    }

    /// Advance to the next projection year
    pub fn advance_year(&mut self) -> u32 {
        self.year += 1;
        self.year
    }

    /// Record this year's cash flows in both series
    pub fn push_flows(&mut self, before_tax: f64, after_tax: f64) {
        self.before_tax_flows.push(before_tax);
        self.after_tax_flows.push(after_tax);
    }

    /// Before-tax series ending in a hypothetical sale this year
    pub fn before_tax_series_with_sale(&self, sale_value: f64) -> Vec<f64> {
        with_terminal_value(&self.before_tax_flows, sale_value)
    }

    /// After-tax series ending in a hypothetical sale this year
    pub fn after_tax_series_with_sale(&self, sale_value: f64) -> Vec<f64> {
        with_terminal_value(&self.after_tax_flows, sale_value)
    }
}

fn with_terminal_value(flows: &[f64], terminal: f64) -> Vec<f64> {
    let mut series = flows.to_vec();
    if let Some(last) = series.last_mut() {
        *last += terminal;
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_keeps_history() {
        let mut state = ProjectionState::at_purchase(1000.0);
        assert_eq!(state.advance_year(), 1);
        state.push_flows(100.0, 80.0);
        assert_eq!(state.advance_year(), 2);
        state.push_flows(110.0, 90.0);

        assert_eq!(state.before_tax_series_with_sale(500.0), vec![-1000.0, 100.0, 610.0]);
        assert_eq!(state.after_tax_series_with_sale(400.0), vec![-1000.0, 80.0, 490.0]);
        // The stored series is not altered by the sale
        assert_eq!(state.before_tax_flows, vec![-1000.0, 100.0, 110.0]);
    }
}
