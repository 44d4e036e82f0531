// models/src/inputs.rs
// Helpers for the loosely typed JSON bodies the dashboards post.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};

/// A number that may arrive either as a JSON number or as a numeric string
/// (form inputs are frequently posted unconverted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerces to `f64`. Blank strings are treated as absent.
    pub fn to_f64(&self, field: &'static str) -> ValidationResult<Option<f64>> {
        match self {
            NumericInput::Number(n) => Ok(Some(*n)),
            NumericInput::Text(s) if s.trim().is_empty() => Ok(None),
            NumericInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ValidationError::invalid(field, format!("'{}' is not a number", s))),
        }
    }
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        NumericInput::Number(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        NumericInput::Text(s.to_string())
    }
}

/// Required, trimmed, non-empty text.
pub fn required_text(value: &Option<String>, field: &'static str) -> ValidationResult<String> {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Optional text where an empty string means "not provided".
pub fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn required_uuid(value: &Option<String>, field: &'static str) -> ValidationResult<Uuid> {
    let raw = required_text(value, field)?;
    Uuid::parse_str(&raw).map_err(|_| ValidationError::invalid(field, "not a valid identifier"))
}

pub fn optional_uuid(value: &Option<String>, field: &'static str) -> ValidationResult<Option<Uuid>> {
    match optional_text(value) {
        Some(raw) => Uuid::parse_str(&raw)
            .map(Some)
            .map_err(|_| ValidationError::invalid(field, "not a valid identifier")),
        None => Ok(None),
    }
}

/// Dates are plain calendar dates, `YYYY-MM-DD`.
pub fn required_date(value: &Option<String>, field: &'static str) -> ValidationResult<NaiveDate> {
    let raw = required_text(value, field)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid(field, "expected a date formatted YYYY-MM-DD"))
}

/// Parses a stored `HH:MM` or `HH:MM:SS` time of day. One-digit hours are accepted.
pub fn time_of_day(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Times are kept exactly as given once they parse as `HH:MM` or `HH:MM:SS`.
pub fn required_time(value: &Option<String>, field: &'static str) -> ValidationResult<String> {
    let raw = required_text(value, field)?;
    if time_of_day(&raw).is_some() {
        Ok(raw)
    } else {
        Err(ValidationError::invalid(field, "expected a time formatted HH:MM"))
    }
}

/// A monetary amount that counts as zero when absent, blank or NaN.
pub fn charge_or_zero(value: &Option<NumericInput>, field: &'static str) -> ValidationResult<f64> {
    let amount = match value {
        Some(input) => input.to_f64(field)?.unwrap_or(0.0),
        None => 0.0,
    };
    if amount.is_nan() {
        return Ok(0.0);
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::invalid(field, "must be a non-negative amount"));
    }
    Ok(amount)
}

pub fn required_amount(value: &Option<NumericInput>, field: &'static str) -> ValidationResult<f64> {
    let amount = value
        .as_ref()
        .map(|input| input.to_f64(field))
        .transpose()?
        .flatten()
        .ok_or(ValidationError::MissingField(field))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::invalid(field, "must be a non-negative amount"));
    }
    Ok(amount)
}

pub fn required_count(value: &Option<NumericInput>, field: &'static str) -> ValidationResult<u32> {
    let raw = value
        .as_ref()
        .map(|input| input.to_f64(field))
        .transpose()?
        .flatten()
        .ok_or(ValidationError::MissingField(field))?;
    if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 || raw > u32::MAX as f64 {
        return Err(ValidationError::invalid(field, "must be a non-negative whole number"));
    }
    Ok(raw as u32)
}

/// A signed whole number, e.g. a floor that may be below ground.
pub fn required_integer(value: &Option<NumericInput>, field: &'static str) -> ValidationResult<i32> {
    let raw = value
        .as_ref()
        .map(|input| input.to_f64(field))
        .transpose()?
        .flatten()
        .ok_or(ValidationError::MissingField(field))?;
    if !raw.is_finite() || raw.fract() != 0.0 || raw < i32::MIN as f64 || raw > i32::MAX as f64 {
        return Err(ValidationError::invalid(field, "must be a whole number"));
    }
    Ok(raw as i32)
}

pub fn optional_count(value: &Option<NumericInput>, field: &'static str) -> ValidationResult<Option<u32>> {
    match value {
        Some(input) if input.to_f64(field)?.is_some() => required_count(value, field).map(Some),
        _ => Ok(None),
    }
}

pub fn optional_amount(value: &Option<NumericInput>, field: &'static str) -> ValidationResult<Option<f64>> {
    match value {
        Some(input) if input.to_f64(field)?.is_some() => required_amount(value, field).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_are_coerced() {
        let v = Some(NumericInput::from("10.50"));
        assert_eq!(required_amount(&v, "price_per_unit").unwrap(), 10.5);
        let q = Some(NumericInput::from(" 100 "));
        assert_eq!(required_count(&q, "stock_quantity").unwrap(), 100);
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let q = Some(NumericInput::from(2.5));
        assert!(matches!(
            required_count(&q, "stock_quantity"),
            Err(ValidationError::InvalidField { field: "stock_quantity", .. })
        ));
    }

    #[test]
    fn absent_and_blank_charges_are_zero() {
        assert_eq!(charge_or_zero(&None, "room_charges").unwrap(), 0.0);
        assert_eq!(charge_or_zero(&Some(NumericInput::from("")), "room_charges").unwrap(), 0.0);
        assert!(charge_or_zero(&Some(NumericInput::from(-1.0)), "room_charges").is_err());
    }

    #[test]
    fn blank_optional_text_is_absent() {
        assert_eq!(optional_text(&Some("   ".into())), None);
        assert_eq!(optional_text(&Some(" Pfizer ".into())), Some("Pfizer".into()));
    }

    #[test]
    fn time_is_kept_verbatim() {
        assert_eq!(required_time(&Some("10:00".into()), "appointment_time").unwrap(), "10:00");
        assert!(required_time(&Some("25:00".into()), "appointment_time").is_err());
        assert_eq!(
            required_time(&None, "appointment_time"),
            Err(ValidationError::MissingField("appointment_time"))
        );
    }
}
