//! Turns measurement results into log rows.

use crate::row::{
    Cell,
    Row,
};
use chrono::{
    DateTime,
    Local,
    NaiveDateTime,
    SubsecRound as _,
    Utc,
};
use serde_json::Value;
use speedlog_config::{
    FieldSelector,
    KnownField,
};
use speedlog_provider::MeasurementResult;

/// Local time as written to the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The configured fields do not fit the result the provider returned. This is a configuration
/// defect and never recorded as a failed measurement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Measurement result has no field {0:?}")]
    MissingField(String),
    #[error("Field {field:?} is not a number: {value}")]
    NotANumber { field: String, value: String },
    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Builds the row for a successful measurement. `notes` stays empty.
pub fn success_row(result: &MeasurementResult, fields: &[FieldSelector]) -> Result<Row, FormatError> {
    fields.iter().map(|field| format_field(result, field)).collect()
}

/// Builds the row for a measurement that did not produce a result: `n/a` everywhere except the
/// capture time and the note.
pub fn failure_row(fields: &[FieldSelector], note: &str, captured_at: DateTime<Local>) -> Row {
    fields
        .iter()
        .map(|field| match field.known() {
            Some(KnownField::Timestamp) => Cell::Value(captured_at.format(TIMESTAMP_FORMAT).to_string()),
            Some(KnownField::Notes) => Cell::Value(note.to_string()),
            _ => Cell::NotAvailable,
        })
        .collect()
}

fn format_field(result: &MeasurementResult, field: &FieldSelector) -> Result<Cell, FormatError> {
    let name = match field {
        FieldSelector::Nested(outer, inner) => {
            return result
                .get_nested(outer, inner)
                .map(|value| Cell::Value(render(value)))
                .ok_or_else(|| FormatError::MissingField(format!("{outer}.{inner}")));
        }
        FieldSelector::Key(name) => name,
    };

    let known = field.known();
    if known == Some(KnownField::Notes) {
        return Ok(Cell::Empty);
    }

    let value = result
        .get(name)
        .ok_or_else(|| FormatError::MissingField(name.clone()))?;

    let formatted = match known {
        Some(KnownField::Timestamp) => {
            let raw = value.as_str().ok_or_else(|| FormatError::InvalidTimestamp {
                value: value.to_string(),
                reason: "not a string".to_string(),
            })?;
            localize_timestamp(raw)?
        }
        Some(KnownField::Download | KnownField::Upload) => {
            let bits = as_number(value).ok_or_else(|| FormatError::NotANumber {
                field: name.clone(),
                value: value.to_string(),
            })?;
            megabits(bits)
        }
        _ => render(value),
    };
    Ok(Cell::Value(formatted))
}

/// Bits per second to megabits per second with two decimals.
pub fn megabits(bits_per_second: f64) -> String {
    format!("{:.2}", bits_per_second / 1_000_000.0)
}

/// Converts an ISO-8601 UTC timestamp to local time with whole seconds.
///
/// Timestamps without an offset are taken to be UTC.
pub fn localize_timestamp(raw: &str) -> Result<String, FormatError> {
    let utc = match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => {
            let whole_seconds = raw.split('.').next().unwrap_or(raw);
            NaiveDateTime::parse_from_str(whole_seconds, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(whole_seconds, "%Y-%m-%d %H:%M:%S"))
                .map_err(|e| FormatError::InvalidTimestamp {
                    value: raw.to_string(),
                    reason: e.to_string(),
                })?
                .and_utc()
        }
    };
    Ok(utc
        .trunc_subsecs(0)
        .with_timezone(&Local)
        .format(TIMESTAMP_FORMAT)
        .to_string())
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| value.as_str()?.trim().parse().ok())
}

/// A result value as written to the log: strings unquoted, `null` empty, anything else as JSON.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
