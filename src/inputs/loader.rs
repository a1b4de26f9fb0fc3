//! Fail-soft loading of analysis inputs from JSON
//!
//! Field values may arrive as numbers, numeric strings, empty strings or not at
//! all. Anything missing or unparsable is replaced by the documented default in
//! [`defaults`] and a warning is logged; only a structurally malformed record
//! (a section that is not an object, a unit list that is not an array) is an error.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, warn};
use serde_json::{Map, Value};

use super::data::{
    default_purchase_date, defaults, AnalysisInput, CapitalGainsElection, EscalationRates,
    ExpenseInfo, LoanInfo, PropertyInfo, PurchaseInfo, TaxInfo, Unit,
};
use crate::error::{AnalysisError, Result};

/// Load and normalize a single input record from a JSON file
pub fn load_input<P: AsRef<Path>>(path: P) -> Result<AnalysisInput> {
    let value = read_json(path.as_ref())?;
    normalize(&value)
}

/// Load a batch of input records. Accepts either a JSON array of records or a single record.
pub fn load_inputs<P: AsRef<Path>>(path: P) -> Result<Vec<AnalysisInput>> {
    let value = read_json(path.as_ref())?;
    match &value {
        Value::Array(items) => items.iter().map(normalize).collect(),
        _ => Ok(vec![normalize(&value)?]),
    }
}

/// Parse and normalize a single input record from JSON text
pub fn parse_input(text: &str) -> Result<AnalysisInput> {
    let value: Value = serde_json::from_str(text)?;
    normalize(&value)
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Normalize a raw JSON record into a complete [`AnalysisInput`].
///
/// Section names follow the input form (`property_info`, `purchase_info`,
/// `loan_info`, `yearly_rate_increase`, `owner_paid_expenses`, `tax_info`);
/// the field names of [`AnalysisInput`] are accepted as well so serialized
/// inputs load back unchanged.
pub fn normalize(value: &Value) -> Result<AnalysisInput> {
    let root = value.as_object().ok_or_else(|| AnalysisError::MalformedInput {
        section: "<root>".to_string(),
        reason: "is not an object".to_string(),
    })?;

    let property = Section::find(root, &["property_info", "property"])?;
    let purchase = Section::find(root, &["purchase_info", "purchase"])?;
    let loan = Section::find(root, &["loan_info", "loan"])?;
    let escalation = Section::find(root, &["yearly_rate_increase", "rates", "escalation"])?;
    let expenses = Section::find(root, &["owner_paid_expenses", "expenses_info", "expenses"])?;
    let tax = Section::find(root, &["tax_info", "tax"])?;

    let units = parse_units(&property)?;
    let property = parse_property(&property, units);
    let purchase = parse_purchase(&purchase, &property.units);
    let loan = parse_loan(&loan);

    Ok(AnalysisInput {
        property,
        purchase,
        loan,
        escalation: parse_escalation(&escalation),
        expenses: parse_expenses(&expenses),
        tax: parse_tax(&tax),
    })
}

fn parse_units(section: &Section) -> Result<Vec<Unit>> {
    let Some(raw) = section.get(&["units"]) else {
        return Ok(Vec::new());
    };
    let items = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(AnalysisError::MalformedInput {
                section: "property_info.units".to_string(),
                reason: "is not an array".to_string(),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let map = item.as_object().ok_or_else(|| AnalysisError::MalformedInput {
                section: format!("property_info.units[{}]", i),
                reason: "is not an object".to_string(),
            })?;
            let unit = Section { name: "unit", map: Some(map) };
            Ok(Unit {
                beds: unit.count(&["beds"], defaults::BEDS),
                baths: unit.amount(&["baths"], defaults::BATHS),
                rent: unit.amount(&["rent"], 0.0),
            })
        })
        .collect()
}

fn parse_property(s: &Section, units: Vec<Unit>) -> PropertyInfo {
    let beds_fallback = if units.is_empty() {
        defaults::BEDS
    } else {
        units.iter().map(|u| u.beds).sum()
    };
    let baths_fallback = if units.is_empty() {
        defaults::BATHS
    } else {
        units.iter().map(|u| u.baths).sum()
    };

    PropertyInfo {
        property_type: s.text(&["property_type"], defaults::PROPERTY_TYPE),
        street: s.text(&["street"], ""),
        city: s.text(&["city"], ""),
        state: s.text(&["state"], ""),
        zip_code: s.text(&["zip_code"], ""),
        year_built: s.integer(&["year_built"], defaults::YEAR_BUILT as i64) as i32,
        sqft: s.amount(&["sqft"], defaults::SQUARE_FOOTAGE),
        lot_size: s.amount(&["lot_size"], defaults::LOT_SIZE),
        parking: s.text(&["parking"], defaults::PARKING),
        total_beds: s.count(&["total_beds"], beds_fallback),
        total_baths: s.amount(&["total_baths"], baths_fallback),
        units,
    }
}

fn parse_purchase(s: &Section, units: &[Unit]) -> PurchaseInfo {
    let unit_rent: f64 = units.iter().map(|u| u.rent).sum();
    PurchaseInfo {
        rent_monthly: s.amount(&["rent_monthly"], unit_rent),
        purchase_price: s.amount(&["purchase_price"], 0.0),
        closing_cost: s.amount(&["closing_cost"], 0.0),
        initial_improvements: s.amount(&["initial_improvements"], 0.0),
        purchase_date: s.date(&["purchase_date"]),
    }
}

fn parse_loan(s: &Section) -> LoanInfo {
    let loan = LoanInfo {
        percent_down: s.fraction(&["percent_down"], defaults::PERCENT_DOWN),
        interest_rate: s.fraction(&["interest_rate"], defaults::INTEREST_RATE),
        loan_term_years: loan_term(s),
        interest_only: s.flag(&["interest_only"], false),
    };
    if loan.interest_only {
        warn!("interest-only flag is set; payments are still computed as fully amortizing");
    }
    loan
}

fn loan_term(s: &Section) -> u32 {
    let years = s.count(&["loan_term_years"], defaults::LOAN_TERM_YEARS);
    if years > defaults::MAX_LOAN_TERM_YEARS {
        warn!(
            "{}.loan_term_years: {} exceeds {} years, using {}",
            s.name,
            years,
            defaults::MAX_LOAN_TERM_YEARS,
            defaults::LOAN_TERM_YEARS
        );
        return defaults::LOAN_TERM_YEARS;
    }
    years
}

fn parse_escalation(s: &Section) -> EscalationRates {
    EscalationRates {
        appreciation: s.fraction(&["appreciation"], defaults::APPRECIATION),
        rent_increase: s.fraction(&["rent_rate_inc", "rent_increase"], defaults::RENT_INCREASE),
        property_tax_increase: s.fraction(
            &["property_tax_rate_inc", "property_tax_increase"],
            defaults::PROPERTY_TAX_INCREASE,
        ),
        insurance_increase: s.fraction(
            &["insurance_rate_inc", "insurance_increase"],
            defaults::INSURANCE_INCREASE,
        ),
        utility_increase: s.fraction(
            &["utility_rate_inc", "utility_increase"],
            defaults::UTILITY_INCREASE,
        ),
    }
}

fn parse_expenses(s: &Section) -> ExpenseInfo {
    ExpenseInfo {
        property_tax_annual: s.amount(&["property_tax_yr", "property_tax_annual"], 0.0),
        insurance_monthly: s.amount(&["insurance_mo", "insurance_monthly"], 0.0),
        water_monthly: s.amount(&["water_mo", "water_monthly"], 0.0),
        sewer_monthly: s.amount(&["sewer_mo", "sewer_monthly"], 0.0),
        garbage_monthly: s.amount(&["garbage_mo", "garbage_monthly"], 0.0),
        gas_electric_monthly: s.amount(&["gas_electric_mo", "gas_electric_monthly"], 0.0),
        lawn_monthly: s.amount(&["lawn_mo", "lawn_monthly"], 0.0),
        hoa_monthly: s.amount(&["hoa", "hoa_monthly"], 0.0),
        other_monthly: s.amount(&["other_expenses", "other_monthly"], 0.0),
        management_rate: s.fraction(&["management_rate"], defaults::MANAGEMENT_RATE),
        vacancy_rate: s.fraction(&["vacancy_rate"], defaults::VACANCY_RATE),
        maintenance_rate: s.fraction(&["maintenance_rate"], defaults::MAINTENANCE_RATE),
    }
}

fn parse_tax(s: &Section) -> TaxInfo {
    let mut depreciation_years = s.amount(&["depreciation_years"], defaults::DEPRECIATION_YEARS);
    if depreciation_years <= 0.0 {
        warn!(
            "{}.depreciation_years must be positive, using {}",
            s.name,
            defaults::DEPRECIATION_YEARS
        );
        depreciation_years = defaults::DEPRECIATION_YEARS;
    }

    let capital_gains_election = match s.get(&["q1_tax", "capital_gains_election"]) {
        Some(Value::String(text)) => CapitalGainsElection::parse(text),
        _ => {
            debug!("{}: no capital gains election, taxes apply on sale", s.name);
            CapitalGainsElection::PayCapitalGains
        }
    };

    TaxInfo {
        improved_value_ratio: s.fraction(&["improved_value_ratio"], defaults::IMPROVED_VALUE_RATIO),
        income_tax_rate: s.fraction(&["income_tax_rate"], defaults::INCOME_TAX_RATE),
        capital_gains_rate: s.fraction(
            &["cap_gains_tax_rate", "capital_gains_rate"],
            defaults::CAPITAL_GAINS_RATE,
        ),
        recapture_rate: s.fraction(&["recapture_tax_rate", "recapture_rate"], defaults::RECAPTURE_RATE),
        depreciation_years,
        capital_gains_election,
        selling_cost_rate: s.fraction(
            &["selling_cost_percentage", "selling_cost_rate"],
            defaults::SELLING_COST_RATE,
        ),
    }
}

/// Read-only view of one input section. A missing section behaves like an empty one.
struct Section<'a> {
    name: &'static str,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Section<'a> {
    fn find(root: &'a Map<String, Value>, keys: &[&'static str]) -> Result<Self> {
        for key in keys {
            match root.get(*key) {
                Some(Value::Object(map)) => return Ok(Self { name: keys[0], map: Some(map) }),
                Some(Value::Null) | None => continue,
                Some(_) => {
                    return Err(AnalysisError::MalformedInput {
                        section: key.to_string(),
                        reason: "is not an object".to_string(),
                    })
                }
            }
        }
        debug!("section `{}` missing, using defaults", keys[0]);
        Ok(Self { name: keys[0], map: None })
    }

    fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        let map = self.map?;
        keys.iter().find_map(|k| map.get(*k))
    }

    /// Raw numeric value, or None when missing / empty / unparsable
    fn number(&self, keys: &[&str]) -> Option<f64> {
        let field = keys[0];
        let parsed = match self.get(keys) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(text)) => {
                let cleaned: String = text
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, '$' | ',' | '_'))
                    .collect();
                if cleaned.is_empty() {
                    None
                } else {
                    let value = cleaned.parse::<f64>().ok();
                    if value.is_none() {
                        warn!("{}.{}: cannot parse {:?} as a number", self.name, field, text);
                    }
                    value
                }
            }
            Some(other) => {
                warn!("{}.{}: expected a number, got {}", self.name, field, other);
                None
            }
        };
        parsed.filter(|v| v.is_finite())
    }

    /// Non-negative currency or measurement
    fn amount(&self, keys: &[&str], default: f64) -> f64 {
        match self.number(keys) {
            Some(v) if v >= 0.0 => v,
            Some(v) => {
                warn!("{}.{}: negative value {} replaced by {}", self.name, keys[0], v, default);
                default
            }
            None => {
                debug!("{}.{}: defaulting to {}", self.name, keys[0], default);
                default
            }
        }
    }

    /// Rate expressed as a fraction, clamped to [0, 1]
    fn fraction(&self, keys: &[&str], default: f64) -> f64 {
        match self.number(keys) {
            Some(v) if (0.0..=1.0).contains(&v) => v,
            Some(v) => {
                let clamped = v.clamp(0.0, 1.0);
                warn!("{}.{}: rate {} outside [0, 1], clamped to {}", self.name, keys[0], v, clamped);
                clamped
            }
            None => {
                debug!("{}.{}: defaulting to {}", self.name, keys[0], default);
                default
            }
        }
    }

    fn integer(&self, keys: &[&str], default: i64) -> i64 {
        self.number(keys).map(|v| v.round() as i64).unwrap_or(default)
    }

    fn count(&self, keys: &[&str], default: u32) -> u32 {
        match self.number(keys) {
            Some(v) if v >= 0.0 => v.round() as u32,
            _ => default,
        }
    }

    fn flag(&self, keys: &[&str], default: bool) -> bool {
        match self.get(keys) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(default),
            Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => true,
                "false" | "no" | "n" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }

    fn text(&self, keys: &[&str], default: &str) -> String {
        match self.get(keys) {
            Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => default.to_string(),
        }
    }

    fn date(&self, keys: &[&str]) -> NaiveDate {
        let Some(Value::String(text)) = self.get(keys) else {
            return default_purchase_date();
        };
        let text = text.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(text.get(..10).unwrap_or(text), "%Y-%m-%d"))
            .unwrap_or_else(|_| {
                warn!("{}.{}: cannot parse date {:?}", self.name, keys[0], text);
                default_purchase_date()
            })
    }
}
