//! # Calculator Inputs
//!
//! Front ends hand calculators a loose `field name -> value` map (slider
//! positions, text boxes, `--set key=value` flags). Each calculator publishes
//! a static table of [`InputField`]s describing what it reads, and converts
//! the map into its typed `*Input` struct through [`InputValues::number`].
//!
//! ## Reading rules
//!
//! - Missing field: the field's default
//! - `Number`: used as-is
//! - `Text`: parsed after stripping `$`, `,`, `%` and whitespace
//! - Unparsable text or a value outside `[min, max]`: `CalcError::InvalidInput`
//!
//! ## Example
//!
//! ```rust
//! use housemath_core::inputs::{FieldUnit, InputField, InputValues};
//!
//! const DOWN: InputField =
//!     InputField::new("down_payment_pct", "Down Payment", 20.0, 0.0, 100.0, FieldUnit::Percent);
//!
//! let values = InputValues::new().with("down_payment_pct", "25%");
//! assert_eq!(values.number(&DOWN).unwrap(), 25.0);
//! assert_eq!(DOWN.display(25.0), "25%");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::Dollars;

/// A single raw input value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    /// Interpret the value as a number, if possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) => Some(*n),
            InputValue::Text(text) => parse_number(text),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Number(n) => write!(f, "{}", n),
            InputValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

/// Parse user-typed numbers like `$300,000`, `6.5%` or ` 12 `.
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Ordered map of field name to raw value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputValues(BTreeMap<String, InputValue>);

impl InputValues {
    pub fn new() -> Self {
        InputValues(BTreeMap::new())
    }

    /// Values holding every field's default.
    pub fn defaults(fields: &[InputField]) -> Self {
        fields
            .iter()
            .map(|f| (f.name.to_string(), InputValue::Number(f.default)))
            .collect()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<InputValue>,
    ) -> Option<InputValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<InputValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.0.iter()
    }

    /// Read a numeric field, applying the default and range rules.
    pub fn number(&self, field: &InputField) -> CalcResult<f64> {
        match self.get(field.name) {
            None => Ok(field.default),
            Some(raw) => {
                let value = raw.as_number().ok_or_else(|| {
                    CalcError::invalid_input(field.name, raw.to_string(), "Not a number")
                })?;
                field.check(value)
            }
        }
    }

    /// Read a field that counts whole periods (months, years of a term).
    pub fn whole(&self, field: &InputField) -> CalcResult<u32> {
        let value = self.number(field)?;
        if value.fract() != 0.0 {
            return Err(CalcError::invalid_input(
                field.name,
                value.to_string(),
                "Must be a whole number",
            ));
        }
        Ok(value as u32)
    }

    /// Reject names that no field in `fields` declares.
    pub fn check_known(&self, fields: &[InputField]) -> CalcResult<()> {
        for name in self.0.keys() {
            if find_field(fields, name).is_none() {
                return Err(CalcError::invalid_input(name.as_str(), "", "Unknown field"));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, InputValue)> for InputValues {
    fn from_iter<I: IntoIterator<Item = (String, InputValue)>>(iter: I) -> Self {
        InputValues(iter.into_iter().collect())
    }
}

/// Unit a field is entered in; drives label formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldUnit {
    Currency,
    Percent,
    Years,
    Months,
    Days,
    Count,
}

impl FieldUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            FieldUnit::Currency | FieldUnit::Count => "",
            FieldUnit::Percent => "%",
            FieldUnit::Years => " yrs",
            FieldUnit::Months => " mo",
            FieldUnit::Days => " days",
        }
    }
}

/// Static description of one calculator input (a slider or text box).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputField {
    /// Key in [`InputValues`]
    pub name: &'static str,
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub unit: FieldUnit,
}

impl InputField {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        default: f64,
        min: f64,
        max: f64,
        unit: FieldUnit,
    ) -> Self {
        InputField {
            name,
            label,
            default,
            min,
            max,
            unit,
        }
    }

    /// Label text for a slider position: the value followed by its unit.
    pub fn display(&self, value: f64) -> String {
        match self.unit {
            FieldUnit::Currency => Dollars(value).whole(),
            unit => format!("{}{}", value, unit.suffix()),
        }
    }

    /// Range-check a value for this field.
    pub fn check(&self, value: f64) -> CalcResult<f64> {
        if !value.is_finite() {
            return Err(CalcError::invalid_input(self.name, value.to_string(), "Not a number"));
        }
        if value < self.min || value > self.max {
            return Err(CalcError::invalid_input(
                self.name,
                value.to_string(),
                format!("Must be between {} and {}", self.min, self.max),
            ));
        }
        Ok(value)
    }
}

/// Look up a field by name.
pub fn find_field<'a>(fields: &'a [InputField], name: &str) -> Option<&'a InputField> {
    fields.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE: InputField = InputField::new(
        "price",
        "Price",
        300_000.0,
        1.0,
        100_000_000.0,
        FieldUnit::Currency,
    );
    const RATE: InputField =
        InputField::new("rate_pct", "Rate", 6.0, 0.0, 30.0, FieldUnit::Percent);
    const TERM: InputField =
        InputField::new("term_years", "Term", 30.0, 1.0, 40.0, FieldUnit::Years);

    #[test]
    fn test_missing_field_uses_default() {
        let values = InputValues::new();
        assert_eq!(values.number(&PRICE).unwrap(), 300_000.0);
    }

    #[test]
    fn test_text_is_parsed() {
        let values = InputValues::new()
            .with("price", "$425,000")
            .with("rate_pct", " 6.75% ");
        assert_eq!(values.number(&PRICE).unwrap(), 425_000.0);
        assert_eq!(values.number(&RATE).unwrap(), 6.75);
    }

    #[test]
    fn test_bad_text_names_the_field() {
        let values = InputValues::new().with("rate_pct", "six");
        match values.number(&RATE) {
            Err(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "rate_pct"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range() {
        let values = InputValues::new().with("rate_pct", 31.0);
        assert!(values.number(&RATE).is_err());
        let values = InputValues::new().with("rate_pct", f64::NAN);
        assert!(values.number(&RATE).is_err());
    }

    #[test]
    fn test_whole_numbers() {
        assert_eq!(InputValues::new().with("term_years", 15.0).whole(&TERM).unwrap(), 15);
        assert!(InputValues::new().with("term_years", 15.5).whole(&TERM).is_err());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(RATE.display(6.5), "6.5%");
        assert_eq!(RATE.display(20.0), "20%");
        assert_eq!(TERM.display(30.0), "30 yrs");
        assert_eq!(PRICE.display(300_000.0), "$300,000");
        assert_eq!(PRICE.display(-100.0), "-$100");
        assert_eq!(PRICE.display(-100_500.0), "-$100,500");
    }

    #[test]
    fn test_defaults_and_known_fields() {
        let fields = [PRICE, RATE];
        let values = InputValues::defaults(&fields);
        assert_eq!(values.len(), 2);
        assert!(values.check_known(&fields).is_ok());

        let values = values.with("bogus", 1.0);
        assert!(values.check_known(&fields).is_err());
    }

    #[test]
    fn test_untagged_json() {
        let json = r#"{"price": 250000, "rate_pct": "5.5"}"#;
        let values: InputValues = serde_json::from_str(json).unwrap();
        assert_eq!(values.number(&PRICE).unwrap(), 250_000.0);
        assert_eq!(values.number(&RATE).unwrap(), 5.5);
    }
}
