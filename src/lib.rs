//! Realty Projection - 30-year investment projection engine for rental property
//!
//! This library provides:
//! - Fail-soft normalization of raw property, purchase, loan, expense and tax inputs
//! - Loan amortization with cumulative interest and principal over any period range
//! - Yearly income, expense, tax, equity and sale projections with return ratios
//! - Before- and after-tax IRR for a sale in each projection year
//! - Batch analyses run in parallel

pub mod analysis;
pub mod error;
pub mod inputs;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use analysis::{analyze, analyze_with, Analysis, MILESTONE_YEARS};
pub use error::{AnalysisError, Result};
pub use inputs::{AnalysisInput, CapitalGainsElection, PaymentTiming};
pub use projection::{ProjectionConfig, ProjectionEngine, Ratio, YearlyRecord};
pub use scenario::ScenarioRunner;
