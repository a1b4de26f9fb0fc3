//! Input groups for a single property analysis

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Documented fallbacks used when an input field is missing or unparsable
pub mod defaults {
    pub const PROPERTY_TYPE: &str = "House";
    pub const PARKING: &str = "Garage";
    pub const YEAR_BUILT: i32 = 2024;
    pub const SQUARE_FOOTAGE: f64 = 1000.0;
    pub const LOT_SIZE: f64 = 0.0;
    pub const BEDS: u32 = 3;
    pub const BATHS: f64 = 2.0;

    /// Purchase date used when the supplied date cannot be parsed (2025-01-01)
    pub const PURCHASE_DATE: (i32, u32, u32) = (2025, 1, 1);

    pub const PERCENT_DOWN: f64 = 0.20;
    pub const INTEREST_RATE: f64 = 0.04;
    pub const LOAN_TERM_YEARS: u32 = 30;
    /// Longest accepted loan term
    pub const MAX_LOAN_TERM_YEARS: u32 = 50;

    pub const APPRECIATION: f64 = 0.02;
    pub const RENT_INCREASE: f64 = 0.02;
    pub const PROPERTY_TAX_INCREASE: f64 = 0.02;
    pub const INSURANCE_INCREASE: f64 = 0.02;
    pub const UTILITY_INCREASE: f64 = 0.02;

    pub const MANAGEMENT_RATE: f64 = 0.10;
    pub const VACANCY_RATE: f64 = 0.04;
    pub const MAINTENANCE_RATE: f64 = 0.10;

    pub const IMPROVED_VALUE_RATIO: f64 = 0.7336;
    pub const INCOME_TAX_RATE: f64 = 0.22;
    pub const CAPITAL_GAINS_RATE: f64 = 0.15;
    pub const RECAPTURE_RATE: f64 = 0.25;
    /// Residential rental recovery period
    pub const DEPRECIATION_YEARS: f64 = 27.5;
    pub const SELLING_COST_RATE: f64 = 0.03;
}

/// Election made about capital-gains treatment on sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalGainsElection {
    /// Proceeds rolled into a like-kind (1031) exchange
    Exchange1031,
    /// Lived in as a homestead for 2 of the last 5 years
    HomesteadExclusion,
    /// Some other exemption applies
    OtherExemption,
    /// Capital gains and depreciation recapture are taxed on sale
    PayCapitalGains,
}

impl CapitalGainsElection {
    /// Whether this election suppresses capital-gains and recapture tax
    pub fn is_exempt(&self) -> bool {
        !matches!(self, CapitalGainsElection::PayCapitalGains)
    }

    /// Parse either a snake_case token or one of the form phrases.
    /// Anything unrecognized means tax is paid.
    pub fn parse(text: &str) -> Self {
        let normalized = text.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "exchange1031" | "exchange_1031" | "1031" | "i will use a 1031 exchange" => {
                CapitalGainsElection::Exchange1031
            }
            "homestead_exclusion"
            | "homestead"
            | "i will have lived in it as a homestead for 2 out of 5 years" => {
                CapitalGainsElection::HomesteadExclusion
            }
            "other_exemption" | "other, i will not pay capital gains" => {
                CapitalGainsElection::OtherExemption
            }
            _ => CapitalGainsElection::PayCapitalGains,
        }
    }

    /// Form phrase for this election
    pub fn as_str(&self) -> &'static str {
        match self {
            CapitalGainsElection::Exchange1031 => "I will use a 1031 exchange",
            CapitalGainsElection::HomesteadExclusion => {
                "I will have lived in it as a homestead for 2 out of 5 years"
            }
            CapitalGainsElection::OtherExemption => "Other, I will NOT pay capital gains",
            CapitalGainsElection::PayCapitalGains => "I will pay capital gains tax",
        }
    }
}

/// Payment due convention for the amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Payment due at the end of each period (ordinary annuity)
    #[default]
    EndOfPeriod,
    /// Payment due at the start of each period (annuity due)
    StartOfPeriod,
}

/// One rentable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub beds: u32,
    pub baths: f64,
    /// Monthly rent for this unit
    pub rent: f64,
}

/// Descriptive property information. Carried through to the output unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub property_type: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub year_built: i32,
    pub sqft: f64,
    pub lot_size: f64,
    pub parking: String,
    pub units: Vec<Unit>,
    pub total_beds: u32,
    pub total_baths: f64,
}

impl PropertyInfo {
    /// Single-line street address
    pub fn address(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip_code)
    }
}

/// Purchase price and rental income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseInfo {
    /// Gross monthly rent, all units
    pub rent_monthly: f64,
    pub purchase_price: f64,
    pub closing_cost: f64,
    /// Rehab spent at acquisition
    pub initial_improvements: f64,
    pub purchase_date: NaiveDate,
}

/// Financing terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInfo {
    /// Fraction of purchase price paid in cash (0-1)
    pub percent_down: f64,
    /// Annual interest rate as a fraction
    pub interest_rate: f64,
    pub loan_term_years: u32,
    /// Accepted and reported, but the payment is always fully amortizing
    pub interest_only: bool,
}

impl LoanInfo {
    /// Total number of monthly payments
    pub fn total_periods(&self) -> u32 {
        self.loan_term_years.saturating_mul(12)
    }
}

/// Annual compound growth rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRates {
    pub appreciation: f64,
    pub rent_increase: f64,
    pub property_tax_increase: f64,
    pub insurance_increase: f64,
    pub utility_increase: f64,
}

/// Owner-paid operating expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInfo {
    pub property_tax_annual: f64,
    pub insurance_monthly: f64,
    pub water_monthly: f64,
    pub sewer_monthly: f64,
    pub garbage_monthly: f64,
    pub gas_electric_monthly: f64,
    pub lawn_monthly: f64,
    pub hoa_monthly: f64,
    pub other_monthly: f64,
    /// Fraction of gross rent
    pub management_rate: f64,
    /// Fraction of gross rent
    pub vacancy_rate: f64,
    /// Fraction of gross rent
    pub maintenance_rate: f64,
}

impl ExpenseInfo {
    /// Sum of the monthly owner-paid utility sub-items
    pub fn utilities_monthly(&self) -> f64 {
        self.water_monthly
            + self.sewer_monthly
            + self.garbage_monthly
            + self.gas_electric_monthly
            + self.lawn_monthly
            + self.hoa_monthly
            + self.other_monthly
    }
}

/// Income and sale tax parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInfo {
    /// Share of purchase price attributable to the building (not land)
    pub improved_value_ratio: f64,
    pub income_tax_rate: f64,
    pub capital_gains_rate: f64,
    pub recapture_rate: f64,
    /// Straight-line recovery period, may be fractional
    pub depreciation_years: f64,
    pub capital_gains_election: CapitalGainsElection,
    pub selling_cost_rate: f64,
}

/// Complete, normalized input record for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub property: PropertyInfo,
    pub purchase: PurchaseInfo,
    pub loan: LoanInfo,
    pub escalation: EscalationRates,
    pub expenses: ExpenseInfo,
    pub tax: TaxInfo,
}

impl AnalysisInput {
    /// The single-family reference case: $400k purchase, 20% down at 4%
    /// over 30 years, $4,600/month rent.
    pub fn reference_case() -> Self {
        Self {
            property: PropertyInfo {
                property_type: defaults::PROPERTY_TYPE.to_string(),
                street: "123 ABC Street".to_string(),
                city: "City".to_string(),
                state: "State".to_string(),
                zip_code: "Zip Code".to_string(),
                year_built: 2024,
                sqft: 1234.0,
                lot_size: 1.0,
                parking: defaults::PARKING.to_string(),
                units: vec![Unit { beds: 3, baths: 2.0, rent: 4600.0 }],
                total_beds: 3,
                total_baths: 2.0,
            },
            purchase: PurchaseInfo {
                rent_monthly: 4600.0,
                purchase_price: 400_000.0,
                closing_cost: 12_000.0,
                initial_improvements: 0.0,
                purchase_date: default_purchase_date(),
            },
            loan: LoanInfo {
                percent_down: defaults::PERCENT_DOWN,
                interest_rate: defaults::INTEREST_RATE,
                loan_term_years: defaults::LOAN_TERM_YEARS,
                interest_only: false,
            },
            escalation: EscalationRates {
                appreciation: defaults::APPRECIATION,
                rent_increase: defaults::RENT_INCREASE,
                property_tax_increase: defaults::PROPERTY_TAX_INCREASE,
                insurance_increase: defaults::INSURANCE_INCREASE,
                utility_increase: defaults::UTILITY_INCREASE,
            },
            expenses: ExpenseInfo {
                property_tax_annual: 6000.0,
                insurance_monthly: 0.0,
                water_monthly: 0.0,
                sewer_monthly: 0.0,
                garbage_monthly: 0.0,
                gas_electric_monthly: 0.0,
                lawn_monthly: 0.0,
                hoa_monthly: 0.0,
                other_monthly: 0.0,
                management_rate: defaults::MANAGEMENT_RATE,
                vacancy_rate: defaults::VACANCY_RATE,
                maintenance_rate: defaults::MAINTENANCE_RATE,
            },
            tax: TaxInfo {
                improved_value_ratio: defaults::IMPROVED_VALUE_RATIO,
                income_tax_rate: defaults::INCOME_TAX_RATE,
                capital_gains_rate: defaults::CAPITAL_GAINS_RATE,
                recapture_rate: defaults::RECAPTURE_RATE,
                depreciation_years: defaults::DEPRECIATION_YEARS,
                capital_gains_election: CapitalGainsElection::Exchange1031,
                selling_cost_rate: defaults::SELLING_COST_RATE,
            },
        }
    }
}

/// Fallback purchase date
pub fn default_purchase_date() -> NaiveDate {
    let (y, m, d) = defaults::PURCHASE_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
