use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::model::price_point::{label_from_value, price_from_value, PricePoint};

/// Messages sent from the widget to the stream server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum MessageOut {
    #[serde(rename = "subscribe")]
    Subscribe { stock_code: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { stock_code: String },
}

impl MessageOut {
    pub fn subscribe(stock_code: &str) -> Self {
        MessageOut::Subscribe {
            stock_code: stock_code.to_string(),
        }
    }

    pub fn unsubscribe(stock_code: &str) -> Self {
        MessageOut::Unsubscribe {
            stock_code: stock_code.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Inbound tick as broadcast by the stream server. Anything beyond `price`,
/// `time` and `stock_code` (change, change_rate, ...) is ignored.
#[derive(Debug, Deserialize)]
struct InboundTick {
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    stock_code: Option<Value>,
}

/// A decoded tick and the instrument it names, if it names one.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub stock_code: Option<String>,
    pub point: PricePoint,
}

impl Tick {
    /// Ticks without a `stock_code` belong to whatever is subscribed.
    pub fn is_for(&self, stock_code: Option<&str>) -> bool {
        match (self.stock_code.as_deref(), stock_code) {
            (Some(tagged), Some(current)) => tagged == current,
            _ => true,
        }
    }
}

/// Decode one inbound text frame. A payload is a tick iff it is a JSON object
/// with non-null `price` and `time`; there is no type discrimination.
pub fn decode_tick(text: &str) -> Result<Tick, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    let raw: InboundTick = serde_json::from_value(value).map_err(DecodeError::Malformed)?;

    let price = raw.price.ok_or(DecodeError::MissingField("price"))?;
    let time = raw.time.ok_or(DecodeError::MissingField("time"))?;

    let price = price_from_value(&price).map_err(|reason| DecodeError::InvalidField {
        field: "price",
        reason,
    })?;
    let time = label_from_value(&time).map_err(|reason| DecodeError::InvalidField {
        field: "time",
        reason,
    })?;

    let stock_code = raw
        .stock_code
        .as_ref()
        .and_then(|v| label_from_value(v).ok());

    Ok(Tick {
        stock_code,
        point: PricePoint { time, price },
    })
}
