#![allow(dead_code)]

use realtime_chart::error::AppError;
use realtime_chart::model::snapshot::{ConfigSnapshot, HostConfig};
use realtime_chart::stream::Transport;
use realtime_chart::PricePoint;

/// Transport double that records every request and never delivers events on
/// its own; tests feed `TransportNotice`s by hand.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub connects: Vec<(String, u64)>,
    pub sent: Vec<(u64, String)>,
    pub closes: Vec<u64>,
    pub fail_connect: bool,
    pub fail_send: bool,
}

impl RecordingTransport {
    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Default::default()
        }
    }

    pub fn failing_send() -> Self {
        Self {
            fail_send: true,
            ..Default::default()
        }
    }

    pub fn sent_texts(&self) -> Vec<&str> {
        self.sent.iter().map(|(_, t)| t.as_str()).collect()
    }

    pub fn subscribe_count(&self) -> usize {
        self.sent
            .iter()
            .filter(|(_, t)| t.contains(r#""type":"subscribe""#))
            .count()
    }
}

impl Transport for RecordingTransport {
    fn connect(&mut self, endpoint: &str, generation: u64) -> Result<(), AppError> {
        if self.fail_connect {
            return Err(AppError::Transport("refused".to_string()));
        }
        self.connects.push((endpoint.to_string(), generation));
        Ok(())
    }

    fn send(&mut self, generation: u64, text: String) -> Result<(), AppError> {
        if self.fail_send {
            return Err(AppError::Transport("broken pipe".to_string()));
        }
        self.sent.push((generation, text));
        Ok(())
    }

    fn close(&mut self, generation: u64) {
        self.closes.push(generation);
    }
}

pub fn point(time: &str, price: f64) -> PricePoint {
    PricePoint::new(time, price)
}

pub fn snapshot(
    code: &str,
    avg_price: f64,
    initial: Vec<PricePoint>,
    endpoint: Option<&str>,
) -> ConfigSnapshot {
    ConfigSnapshot::try_from(HostConfig {
        stock_code: code.to_string(),
        stock_name: "Samsung".to_string(),
        avg_price,
        initial_data: initial,
        websocket_url: endpoint.map(str::to_string),
        height: 400,
    })
    .unwrap()
}

pub fn tick_json(time: &str, price: f64) -> String {
    tick_json_for("005930", time, price)
}

pub fn tick_json_for(code: &str, time: &str, price: f64) -> String {
    format!(
        r#"{{"stock_code":"{}","price":{},"time":"{}","change":0,"change_rate":0.0}}"#,
        code, price, time
    )
}
