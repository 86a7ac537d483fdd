use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid host configuration: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A malformed or incomplete inbound stream message. Never fatal.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("field `{0}` is missing or null")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A host configuration push that cannot become a `ConfigSnapshot`.
#[derive(Error, Debug, PartialEq)]
pub enum SnapshotError {
    #[error("stock_code must not be empty")]
    EmptyStockCode,

    #[error("avg_price must be a finite non-negative number, got {0}")]
    InvalidReferencePrice(f64),

    #[error("height must be positive")]
    ZeroHeight,

    #[error("websocket_url `{url}` is not a ws:// or wss:// URI: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
