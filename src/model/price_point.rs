use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chart sample. `time` is an opaque label chosen by the producer and is
/// never reparsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(deserialize_with = "label_from_string_or_number")]
    pub time: String,
    #[serde(deserialize_with = "string_or_number_to_f64")]
    pub price: f64,
}

impl PricePoint {
    pub fn new(time: impl Into<String>, price: f64) -> Self {
        Self {
            time: time.into(),
            price,
        }
    }
}

/// Read a price that may be encoded as a JSON number or a numeric string.
pub fn price_from_value(v: &Value) -> Result<f64, String> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} is not representable", n)),
        Value::String(s) => {
            let parsed = s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("{:?}: {}", s, e))?;
            if parsed.is_finite() {
                Ok(parsed)
            } else {
                Err(format!("{:?} is not finite", s))
            }
        }
        other => Err(format!("expected number, got {}", json_kind(other))),
    }
}

/// Read a time label that may be encoded as a JSON string or a number.
pub fn label_from_value(v: &Value) -> Result<String, String> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected string, got {}", json_kind(other))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_or_number_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    price_from_value(&v).map_err(serde::de::Error::custom)
}

fn label_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    label_from_value(&v).map_err(serde::de::Error::custom)
}
