//! Parser for raw analysis requests.
//!
//! Request bodies arrive as loosely typed JSON: numbers may be JSON numbers
//! or numeric strings, and any field may be missing, `null` or empty. This
//! module turns such a body into a validated [`SoilSample`].
//!
//! Field names on the wire: `location`, `n`, `p`, `k`, `ph`.

use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};
use crate::types::{DEFAULT_LOCATION, DEFAULT_PH, SoilSample};

/// Parse a request body into a [`SoilSample`].
///
/// The body must be a JSON object; see [`parse_soil_map`] for field rules.
pub fn parse_soil_sample(raw: &Value) -> Result<SoilSample> {
    match raw {
        Value::Object(map) => parse_soil_map(map),
        other => Err(ValidationError::NotAnObject {
            found: json_type_name(other),
        }),
    }
}

/// Parse the fields of a request object into a [`SoilSample`].
///
/// - `n`, `p`, `k` default to `0` when absent, `null` or empty
/// - `ph` defaults to `7.0` under the same conditions
/// - `location` defaults to `"Maharashtra"` when absent, `null` or blank
pub fn parse_soil_map(map: &Map<String, Value>) -> Result<SoilSample> {
    let location = parse_location(map.get("location"))?;
    let n = parse_number(map.get("n"), "n", 0.0)?;
    let p = parse_number(map.get("p"), "p", 0.0)?;
    let k = parse_number(map.get("k"), "k", 0.0)?;
    let ph = parse_number(map.get("ph"), "ph", DEFAULT_PH)?;

    SoilSample::new(n, p, k, ph, location)
}

fn parse_location(value: Option<&Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_LOCATION.to_string()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(DEFAULT_LOCATION.to_string())
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(other) => Err(ValidationError::InvalidLocation {
            found: json_type_name(other),
        }),
    }
}

/// Read one numeric field, applying `default` for missing/null/empty values.
fn parse_number(value: Option<&Value>, field: &'static str, default: f64) -> Result<f64> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::NotANumber {
                field,
                value: number.to_string(),
            }),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(default);
            }
            // f64::from_str accepts "NaN" and "inf", so finiteness is checked separately
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ValidationError::NotANumber {
                    field,
                    value: s.clone(),
                })
        }
        Some(other) => Err(ValidationError::InvalidType {
            field,
            found: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
