//! Ratio values with an explicit "not applicable" state

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A ratio whose denominator may be zero or undefined.
///
/// `NotApplicable` is kept distinct from a legitimate `Value(0.0)`. It serializes
/// as `null` and displays as `N/A`; every consumer sees the same representation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ratio {
    Value(f64),
    #[default]
    NotApplicable,
}

impl Ratio {
    /// `numerator / denominator`, or `NotApplicable` when the denominator is
    /// not strictly positive or the quotient is not finite
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator.is_nan() || denominator <= 0.0 {
            return Ratio::NotApplicable;
        }
        let value = numerator / denominator;
        if value.is_finite() {
            Ratio::Value(value)
        } else {
            Ratio::NotApplicable
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Value(v) => Some(v),
            Ratio::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        matches!(self, Ratio::Value(_))
    }

    pub fn unwrap_or(self, default: f64) -> f64 {
        self.value().unwrap_or(default)
    }

}

impl From<Option<f64>> for Ratio {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Ratio::Value(v),
            _ => Ratio::NotApplicable,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Forward precision/width so `{:.2}` works as for f64
            Ratio::Value(v) => fmt::Display::fmt(v, f),
            // Precision would truncate the marker, so honor width only
            Ratio::NotApplicable => write!(f, "{:>width$}", "N/A", width = f.width().unwrap_or(0)),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator() {
        assert_eq!(Ratio::of(10.0, 0.0), Ratio::NotApplicable);
        assert_eq!(Ratio::of(10.0, -5.0), Ratio::NotApplicable);
        assert_eq!(Ratio::of(10.0, f64::NAN), Ratio::NotApplicable);
        assert_eq!(Ratio::of(0.0, 4.0), Ratio::Value(0.0));
        assert_ne!(Ratio::of(0.0, 4.0), Ratio::of(0.0, 0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{:.2}", Ratio::Value(1.23456)), "1.23");
        assert_eq!(format!("{}", Ratio::NotApplicable), "N/A");
        assert_eq!(format!("{:>5}", Ratio::NotApplicable), "  N/A");
        assert_eq!(format!("{:>6.2}", Ratio::NotApplicable), "   N/A");
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Ratio::Value(0.5)).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Ratio::NotApplicable).unwrap(), "null");
        let back: Ratio = serde_json::from_str("null").unwrap();
        assert_eq!(back, Ratio::NotApplicable);
        let back: Ratio = serde_json::from_str("0.25").unwrap();
        assert_eq!(back, Ratio::Value(0.25));
    }
}
