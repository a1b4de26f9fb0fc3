//! Complete analysis output: normalized inputs, derived aggregates and yearly records

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inputs::AnalysisInput;
use crate::projection::{DerivedValues, ProjectionConfig, ProjectionEngine, ProjectionSummary, YearlyRecord};

/// Projection years reported in the snapshot view
pub const MILESTONE_YEARS: [u32; 5] = [1, 5, 10, 20, 30];

/// Output record of one analysis. Consumers read figures from here and never
/// recompute them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub input: AnalysisInput,
    pub derived: DerivedValues,
    pub years: Vec<YearlyRecord>,
}

/// Run an analysis with the default projection config
pub fn analyze(input: AnalysisInput) -> Analysis {
    analyze_with(input, ProjectionConfig::default())
}

/// Run an analysis with an explicit projection config
pub fn analyze_with(input: AnalysisInput, config: ProjectionConfig) -> Analysis {
    let engine = ProjectionEngine::new(config);
    let derived = engine.derive(&input);
    let result = engine.project_derived(&input, &derived);

    let analysis = Analysis {
        input,
        derived,
        years: result.years,
    };

    info!(
        "analysis complete for {}: {} years, final irr {:?}",
        analysis.input.property.address(),
        analysis.years.len(),
        analysis.years.last().and_then(|r| r.irr_before_tax)
    );

    analysis
}

impl Analysis {
    /// Record for a 1-indexed projection year
    pub fn year(&self, year: u32) -> Option<&YearlyRecord> {
        year.checked_sub(1).and_then(|i| self.years.get(i as usize))
    }

    /// Records for the milestone years that fall inside the projection
    pub fn milestones(&self) -> Vec<&YearlyRecord> {
        MILESTONE_YEARS.iter().filter_map(|&y| self.year(y)).collect()
    }

    pub fn final_year(&self) -> Option<&YearlyRecord> {
        self.years.last()
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary::from_records(&self.years)
    }

    /// Write every yearly record to CSV, one row per year
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.years {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
