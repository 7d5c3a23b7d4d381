//! Best-effort extraction of structured decisions from oracle text.
//!
//! The oracle is asked for a bare JSON object but may wrap it in prose or
//! code fences. Everything between the first `{` and the last `}` is taken
//! as the candidate object; anything outside it is ignored.
//!
//! | Decision | Field | Accepted |
//! |----------|-------|----------|
//! | control | `heater_on`, `fan_on`, `water_pump_on`, `grow_lights_on` | boolean |
//! | control | `alert_level` | `"normal"`, `"warning"`, `"critical"` (any case) |
//! | control | `reason` | string |
//! | optimization | `target_temperature`, `target_humidity`, `target_soil_moisture` | number or numeric string |
//! | optimization | `target_light_hours` | integer, number (truncated) or integer string |
//! | optimization | `reason` | any value |
//!
//! Missing and `null` fields are absent. A control field of the wrong type
//! rejects the whole decision; an optimization field of the wrong type is
//! only dropped.

use serde_json::{Map, Value};

use greenloop_core::state::AlertLevel;

use crate::error::DecisionParseError;

/// Slice the candidate JSON object out of a free-form response.
pub fn extract_json_object(text: &str) -> Result<&str, DecisionParseError> {
    let start = text.find('{').ok_or(DecisionParseError::NoObject)?;
    let end = text.rfind('}').ok_or(DecisionParseError::NoObject)?;
    if end < start {
        return Err(DecisionParseError::NoObject);
    }
    Ok(&text[start..=end])
}

fn parse_object(text: &str) -> Result<Map<String, Value>, DecisionParseError> {
    let candidate = extract_json_object(text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DecisionParseError::Malformed(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(DecisionParseError::Malformed(e.to_string())),
    }
}

fn present<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn bool_field(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<bool>, DecisionParseError> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(DecisionParseError::InvalidField {
            field,
            expected: "a boolean",
        }),
    }
}

/// Actuator decision proposed by the oracle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlDecision {
    pub heater_on: Option<bool>,
    pub fan_on: Option<bool>,
    pub water_pump_on: Option<bool>,
    pub grow_lights_on: Option<bool>,
    pub alert_level: Option<AlertLevel>,
    pub reason: Option<String>,
}

impl ControlDecision {
    pub fn parse(text: &str) -> Result<Self, DecisionParseError> {
        let map = parse_object(text)?;

        let alert_level = match present(&map, "alert_level") {
            None => None,
            Some(Value::String(s)) => Some(s.parse::<AlertLevel>().map_err(|_| {
                DecisionParseError::InvalidField {
                    field: "alert_level",
                    expected: "one of normal, warning, critical",
                }
            })?),
            Some(_) => {
                return Err(DecisionParseError::InvalidField {
                    field: "alert_level",
                    expected: "a string",
                })
            }
        };

        let reason = match present(&map, "reason") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(DecisionParseError::InvalidField {
                    field: "reason",
                    expected: "a string",
                })
            }
        };

        Ok(Self {
            heater_on: bool_field(&map, "heater_on")?,
            fan_on: bool_field(&map, "fan_on")?,
            water_pump_on: bool_field(&map, "water_pump_on")?,
            grow_lights_on: bool_field(&map, "grow_lights_on")?,
            alert_level,
            reason,
        })
    }
}

/// Lenient float: JSON numbers and numeric strings, finite only.
fn coerce_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Lenient integer: fractional numbers are truncated toward zero.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Setpoint revision proposed by the oracle. Fields that fail to coerce are
/// `None` and keep their current value when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationDecision {
    pub target_temperature: Option<f64>,
    pub target_humidity: Option<f64>,
    pub target_soil_moisture: Option<f64>,
    pub target_light_hours: Option<i64>,
    pub reason: Option<String>,
}

impl OptimizationDecision {
    pub fn parse(text: &str) -> Result<Self, DecisionParseError> {
        let map = parse_object(text)?;

        let float = |field: &str| present(&map, field).and_then(coerce_f64);
        let reason = present(&map, "reason").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        Ok(Self {
            target_temperature: float("target_temperature"),
            target_humidity: float("target_humidity"),
            target_soil_moisture: float("target_soil_moisture"),
            target_light_hours: present(&map, "target_light_hours").and_then(coerce_i64),
            reason,
        })
    }
}
