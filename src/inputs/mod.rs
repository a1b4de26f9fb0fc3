//! Property, purchase, loan, escalation, expense and tax inputs

mod data;
pub mod loader;

pub use data::{
    default_purchase_date, defaults, AnalysisInput, CapitalGainsElection, EscalationRates,
    ExpenseInfo, LoanInfo, PaymentTiming, PropertyInfo, PurchaseInfo, TaxInfo, Unit,
};
pub use loader::{load_input, load_inputs, normalize, parse_input};
