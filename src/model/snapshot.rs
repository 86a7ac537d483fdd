use serde::Deserialize;

use super::price_point::PricePoint;
use crate::error::SnapshotError;

/// Frame height when the host does not pass one.
pub const DEFAULT_HEIGHT: u32 = 400;

/// Configuration as pushed by the host frame.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub stock_code: String,
    #[serde(default)]
    pub stock_name: String,
    pub avg_price: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub initial_data: Vec<PricePoint>,
    #[serde(default)]
    pub websocket_url: Option<String>,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PricePoint>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<PricePoint>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated host configuration. Replaced wholesale on every push.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    stock_code: String,
    stock_name: String,
    reference_price: f64,
    initial_points: Vec<PricePoint>,
    endpoint: Option<String>,
    height: u32,
}

impl ConfigSnapshot {
    pub fn stock_code(&self) -> &str {
        &self.stock_code
    }

    pub fn stock_name(&self) -> &str {
        &self.stock_name
    }

    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }

    pub fn initial_points(&self) -> &[PricePoint] {
        &self.initial_points
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Parse and validate a raw host push.
    pub fn from_json(raw: &str) -> Result<Self, crate::error::AppError> {
        let host: HostConfig = serde_json::from_str(raw)?;
        Ok(Self::try_from(host)?)
    }
}

impl TryFrom<HostConfig> for ConfigSnapshot {
    type Error = SnapshotError;

    fn try_from(host: HostConfig) -> Result<Self, Self::Error> {
        let stock_code = host.stock_code.trim().to_string();
        if stock_code.is_empty() {
            return Err(SnapshotError::EmptyStockCode);
        }
        if !host.avg_price.is_finite() || host.avg_price < 0.0 {
            return Err(SnapshotError::InvalidReferencePrice(host.avg_price));
        }
        if host.height == 0 {
            return Err(SnapshotError::ZeroHeight);
        }
        let endpoint = match host.websocket_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(validate_endpoint(raw)?),
        };

        Ok(Self {
            stock_code,
            stock_name: host.stock_name,
            reference_price: host.avg_price,
            initial_points: host.initial_data,
            endpoint,
            height: host.height,
        })
    }
}

fn validate_endpoint(raw: &str) -> Result<String, SnapshotError> {
    let invalid = |reason: String| SnapshotError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(raw.to_string()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
