//! Run analyses for a batch of input records
//!
//! Reads a JSON array of input records and writes one headline row per scenario

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use realty_projection::inputs::load_inputs;
use realty_projection::{Analysis, Ratio, ScenarioRunner};

/// Analyze every input record in a JSON file in parallel.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of input records (a single record also works)
    #[arg(long)]
    input: PathBuf,

    /// CSV file receiving one headline row per scenario
    #[arg(long, default_value = "scenario_headlines.csv")]
    output: PathBuf,
}

/// Headline figures for one scenario
#[derive(Debug, Serialize)]
struct HeadlineRow {
    scenario: usize,
    address: String,
    purchase_price: f64,
    rent_monthly: f64,
    total_cash_invested: f64,
    mortgage_monthly: f64,
    noi_year1: f64,
    cap_rate_year1: Ratio,
    cash_on_cash_year1: Ratio,
    debt_coverage_year1: Ratio,
    final_property_value: f64,
    final_equity: f64,
    total_profit_pre_tax: f64,
    total_profit_post_tax: f64,
    irr_before_tax: Option<f64>,
    irr_after_tax: Option<f64>,
}

impl HeadlineRow {
    fn from_analysis(scenario: usize, analysis: &Analysis) -> Self {
        let first = analysis.year(1);
        let last = analysis.final_year();

        Self {
            scenario,
            address: analysis.input.property.address(),
            purchase_price: analysis.input.purchase.purchase_price,
            rent_monthly: analysis.input.purchase.rent_monthly,
            total_cash_invested: analysis.derived.total_cash_invested,
            mortgage_monthly: analysis.derived.mortgage_monthly,
            noi_year1: analysis.derived.noi_initial,
            cap_rate_year1: first.map(|r| r.cap_rate).unwrap_or_default(),
            cash_on_cash_year1: first.map(|r| r.cash_on_cash_return).unwrap_or_default(),
            debt_coverage_year1: first.map(|r| r.debt_coverage_ratio).unwrap_or_default(),
            final_property_value: last.map(|r| r.property_value).unwrap_or(0.0),
            final_equity: last.map(|r| r.equity).unwrap_or(0.0),
            total_profit_pre_tax: last.map(|r| r.total_profit_pre_tax).unwrap_or(0.0),
            total_profit_post_tax: last.map(|r| r.total_profit_post_tax).unwrap_or(0.0),
            irr_before_tax: last.and_then(|r| r.irr_before_tax),
            irr_after_tax: last.and_then(|r| r.irr_after_tax),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading scenarios from {}...", args.input.display());
    let inputs = load_inputs(&args.input)
        .with_context(|| format!("failed to load scenarios from {}", args.input.display()))?;
    println!("Loaded {} scenarios in {:?}", inputs.len(), start.elapsed());

    println!("Running analyses...");
    let run_start = Instant::now();
    let analyses = ScenarioRunner::new().run_batch(&inputs);
    println!("Analyses complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    for (i, analysis) in analyses.iter().enumerate() {
        writer.serialize(HeadlineRow::from_analysis(i + 1, analysis))?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    println!("\nBatch Summary:");
    for (i, analysis) in analyses.iter().enumerate() {
        let irr = analysis
            .final_year()
            .and_then(|r| r.irr_before_tax)
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "N/A".to_string());
        println!("  Scenario {:>3}: {} NOI=${:.0} IRR={}",
            i + 1, analysis.input.property.address(), analysis.derived.noi_initial, irr);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
