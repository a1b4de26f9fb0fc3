//! Realty Projection CLI
//!
//! Runs a single 30-year analysis from a JSON input record (or the reference case)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use realty_projection::inputs::load_input;
use realty_projection::{analyze_with, AnalysisInput, PaymentTiming, ProjectionConfig};

/// Project income, debt, taxes and returns for a rental property purchase.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON input record; the reference case is used when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV file receiving every yearly record
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Print the full output record as JSON
    #[arg(long)]
    json: bool,

    /// When monthly loan payments fall due
    #[arg(long, value_enum, default_value_t = Timing::End)]
    payment_timing: Timing,
}

#[derive(Clone, Copy, ValueEnum)]
enum Timing {
    End,
    Start,
}

impl From<Timing> for PaymentTiming {
    fn from(timing: Timing) -> Self {
        match timing {
            Timing::End => PaymentTiming::EndOfPeriod,
            Timing::Start => PaymentTiming::StartOfPeriod,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let input = match &cli.input {
        Some(path) => load_input(path)
            .with_context(|| format!("failed to load input from {}", path.display()))?,
        None => AnalysisInput::reference_case(),
    };

    let config = ProjectionConfig {
        payment_timing: cli.payment_timing.into(),
        ..Default::default()
    };
    let analysis = analyze_with(input, config);

    if cli.json {
        let json = serde_json::to_string_pretty(&analysis).context("failed to encode analysis")?;
        println!("{}", json);
    } else {
        print_report(&analysis);
    }

    analysis
        .write_csv(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    eprintln!("Full results written to: {}", cli.output.display());

    Ok(())
}

fn print_report(analysis: &realty_projection::Analysis) {
    let input = &analysis.input;
    let derived = &analysis.derived;

    println!("Realty Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    println!("Property: {}", input.property.address());
    println!("  Type: {} ({} bd / {} ba, {:.0} sqft)",
        input.property.property_type, input.property.total_beds, input.property.total_baths, input.property.sqft);
    println!("  Purchase Price: ${:.2}", input.purchase.purchase_price);
    println!("  Monthly Rent: ${:.2}", input.purchase.rent_monthly);
    println!("  Down Payment: ${:.2}", derived.down_payment);
    println!("  Loan Amount: ${:.2}", derived.loan_amount);
    println!("  Monthly Payment: ${:.2}", derived.mortgage_monthly);
    println!("  Total Cash Invested: ${:.2}", derived.total_cash_invested);
    println!("  Year-1 NOI: ${:.2}", derived.noi_initial);
    println!("  Initial Cap Rate: {:.4}", derived.initial_cap_rate);
    println!("  Capital Gains Election: {}", input.tax.capital_gains_election.as_str());
    println!();

    println!("{:>4} {:>12} {:>12} {:>12} {:>14} {:>14} {:>8} {:>8} {:>8} {:>8}",
        "Year", "NOI", "CF Pre-Tax", "CF Post-Tax", "Balance", "Value", "CapRate", "CoC", "DCR", "IRR");
    println!("{}", "-".repeat(110));

    for row in analysis.milestones() {
        let irr = row
            .irr_before_tax
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "N/A".to_string());
        println!("{:>4} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>8.4} {:>8.4} {:>8.2} {:>8}",
            row.year,
            row.noi,
            row.cash_flow_before_tax,
            row.cash_flow_after_tax,
            row.mortgage_balance,
            row.property_value,
            row.cap_rate,
            row.cash_on_cash_return,
            row.debt_coverage_ratio,
            irr,
        );
    }

    let summary = analysis.summary();
    println!("\nSummary:");
    println!("  Total Years: {}", summary.total_years);
    println!("  Total NOI: ${:.2}", summary.total_noi);
    println!("  Total Interest: ${:.2}", summary.total_interest);
    println!("  Total Income Tax: ${:.2}", summary.total_income_tax);
    println!("  Total Cash Flow: ${:.2}", summary.total_cash_flow);
    println!("  Final Property Value: ${:.2}", summary.final_property_value);
    println!("  Final Equity: ${:.2}", summary.final_equity);
    println!("  Final Profit (post-tax): ${:.2}", summary.final_profit_post_tax);
}
