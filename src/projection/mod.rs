//! Projection engine for yearly rental property projections

mod amortization;
mod derived;
mod engine;
pub mod irr;
mod ratio;
mod records;
mod state;

pub use amortization::{cumulative_interest, cumulative_principal, AmortizationCalculator, PeriodTotals};
pub use derived::DerivedValues;
pub use engine::{ProjectionConfig, ProjectionEngine, PROJECTION_YEARS};
pub use irr::calculate_irr;
pub use ratio::Ratio;
pub use records::{ProjectionResult, ProjectionSummary, YearlyRecord};
pub use state::ProjectionState;
