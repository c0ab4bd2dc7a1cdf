//! Numeric Vital Extraction using regex patterns.
//!
//! Runs over the raw text, independent of the recognizer. Each pattern
//! contributes at most one vital (its first match). Values are kept as the
//! literal digits found, never parsed.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::record::Vital;

pub const BLOOD_PRESSURE_LABEL: &str = "Blood Pressure";
pub const WEIGHT_LABEL: &str = "Weight";

// Compile patterns once at startup
static BLOOD_PRESSURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2,3}/\d{2,3})").expect("Invalid regex: blood pressure pattern")
});

static WEIGHT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2,3})\s*(?:kg|kg\.|kilograms)").expect("Invalid regex: weight pattern")
});

/// Pattern definition for one kind of vital
struct VitalPattern {
    label: &'static str,
    regex: &'static Regex,
}

/// Extracts blood pressure and weight readings from raw text
pub struct VitalExtractor {
    patterns: Vec<VitalPattern>,
}

impl Default for VitalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalExtractor {
    /// Create an extractor with the blood pressure and weight patterns, in that order
    pub fn new() -> Self {
        let patterns = vec![
            VitalPattern {
                label: BLOOD_PRESSURE_LABEL,
                regex: &BLOOD_PRESSURE_PATTERN,
            },
            VitalPattern {
                label: WEIGHT_LABEL,
                regex: &WEIGHT_PATTERN,
            },
        ];

        Self { patterns }
    }

    /// Extract up to one vital per pattern.
    ///
    /// The value is the first capture group: the whole "120/80" reading for
    /// blood pressure, the digits without the unit for weight.
    pub fn extract(&self, text: &str) -> Vec<Vital> {
        let mut vitals = Vec::new();

        for pattern in &self.patterns {
            let Some(value) = pattern
                .regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
            else {
                continue;
            };

            debug!("Matched {}: {}", pattern.label, value);
            vitals.push(Vital::new(pattern.label, value));
        }

        vitals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_pressure() {
        let vitals = VitalExtractor::new().extract("BP 120/80 recorded");
        assert_eq!(vitals, vec![Vital::new("Blood Pressure", "120/80")]);
    }

    #[test]
    fn test_blood_pressure_too_short() {
        assert!(VitalExtractor::new().extract("5/8").is_empty());
    }

    #[test]
    fn test_first_match_only() {
        let vitals = VitalExtractor::new().extract("130/85 then 120/80");
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].value, "130/85");
    }

    #[test]
    fn test_weight_units() {
        let extractor = VitalExtractor::new();
        for text in ["75kg", "75 KG", "75 kg.", "75 Kilograms"] {
            let vitals = extractor.extract(text);
            assert_eq!(vitals, vec![Vital::new("Weight", "75")], "for '{}'", text);
        }
    }

    #[test]
    fn test_weight_requires_unit() {
        assert!(VitalExtractor::new().extract("weight 75").is_empty());
        assert!(VitalExtractor::new().extract("5kg").is_empty());
    }

    #[test]
    fn test_order_blood_pressure_then_weight() {
        let vitals = VitalExtractor::new().extract("Weight 82 kg, BP 140/90");
        assert_eq!(vitals[0].label, "Blood Pressure");
        assert_eq!(vitals[1].label, "Weight");
        assert_eq!(vitals[1].value, "82");
    }
}
