//! Scenario runner for batch analyses
//!
//! Analyses share no state, so a batch of inputs is run in parallel and each
//! input gets its own output record.

use std::time::Instant;

use log::info;
use rayon::prelude::*;

use crate::analysis::{analyze_with, Analysis};
use crate::inputs::AnalysisInput;
use crate::projection::ProjectionConfig;

/// Runs analyses for one or many inputs under a shared projection config
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// // Same property at different prices
/// let inputs: Vec<_> = [350_000.0, 400_000.0, 450_000.0]
///     .iter()
///     .map(|&price| { let mut i = AnalysisInput::reference_case(); i.purchase.purchase_price = price; i })
///     .collect();
/// let results = runner.run_batch(&inputs);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create runner with the default projection config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with a specific projection config
    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Run a single analysis
    pub fn run(&self, input: &AnalysisInput) -> Analysis {
        analyze_with(input.clone(), self.config.clone())
    }

    /// Run independent analyses in parallel, results in input order
    pub fn run_batch(&self, inputs: &[AnalysisInput]) -> Vec<Analysis> {
        let start = Instant::now();
        let results: Vec<Analysis> = inputs.par_iter().map(|input| self.run(input)).collect();
        info!("ran {} analyses in {:?}", results.len(), start.elapsed());
        results
    }

    /// Run one input under several configs
    pub fn run_scenarios(&self, input: &AnalysisInput, configs: &[ProjectionConfig]) -> Vec<Analysis> {
        configs
            .par_iter()
            .map(|config| analyze_with(input.clone(), config.clone()))
            .collect()
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }
}
