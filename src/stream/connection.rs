use crate::error::AppError;
use crate::event::{TransportEvent, TransportNotice};
use crate::model::price_point::PricePoint;

use super::wire::{decode_tick, MessageOut};

/// The duplex channel underneath a `StreamConnection`.
///
/// Implementations deliver `TransportEvent`s for a connection tagged with the
/// generation passed to `connect`, asynchronously and in order.
pub trait Transport {
    fn connect(&mut self, endpoint: &str, generation: u64) -> Result<(), AppError>;
    fn send(&mut self, generation: u64, text: String) -> Result<(), AppError>;
    /// Request closure without waiting for it. A no-op for unknown generations.
    fn close(&mut self, generation: u64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Subscribed,
    Closed,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Idle => "IDLE",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Subscribed => "LIVE",
            ConnectionState::Closed => "CLOSED",
        }
    }
}

/// Lifecycle of the single streaming connection owned by a widget.
///
/// Every open bumps `generation`; events tagged with any other generation are
/// late deliveries for a discarded connection and are dropped.
pub struct StreamConnection<T: Transport> {
    transport: T,
    state: ConnectionState,
    generation: u64,
    stock_code: Option<String>,
    endpoint: Option<String>,
}

impl<T: Transport> StreamConnection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::Idle,
            generation: 0,
            stock_code: None,
            endpoint: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stock_code(&self) -> Option<&str> {
        self.stock_code.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Subscribed
        )
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a new connection for `stock_code`. An active connection is
    /// closed first. Returns the generation of the new connection.
    pub fn open(&mut self, endpoint: &str, stock_code: &str) -> Result<u64, AppError> {
        if self.is_active() {
            self.close();
        }

        self.generation += 1;
        self.stock_code = Some(stock_code.to_string());
        self.endpoint = Some(endpoint.to_string());
        self.state = ConnectionState::Connecting;

        tracing::info!(
            endpoint = %endpoint,
            stock_code = %stock_code,
            generation = self.generation,
            "Opening stream connection"
        );

        if let Err(e) = self.transport.connect(endpoint, self.generation) {
            tracing::error!(error = %e, endpoint = %endpoint, "Stream connect failed");
            self.transport.close(self.generation);
            self.state = ConnectionState::Closed;
            return Err(e);
        }
        Ok(self.generation)
    }

    /// Apply one transport event. Returns the decoded tick when the event is
    /// a valid inbound tick for the live connection.
    pub fn handle(&mut self, notice: TransportNotice) -> Option<PricePoint> {
        if notice.generation != self.generation {
            tracing::debug!(
                generation = notice.generation,
                current = self.generation,
                "Dropping event for discarded connection"
            );
            return None;
        }

        match (self.state, notice.event) {
            (ConnectionState::Connecting, TransportEvent::Opened) => {
                self.send_subscribe();
                None
            }
            (ConnectionState::Connecting, TransportEvent::Error(reason)) => {
                tracing::error!(reason = %reason, "Stream connection failed before open");
                self.transport.close(self.generation);
                self.state = ConnectionState::Closed;
                None
            }
            (ConnectionState::Connecting, TransportEvent::Closed { code, reason }) => {
                tracing::warn!(?code, reason = %reason, "Stream closed before open");
                self.state = ConnectionState::Closed;
                None
            }
            (ConnectionState::Subscribed, TransportEvent::Message(text)) => {
                match decode_tick(&text) {
                    Ok(tick) if tick.is_for(self.stock_code.as_deref()) => Some(tick.point),
                    Ok(tick) => {
                        tracing::debug!(
                            tagged = ?tick.stock_code,
                            current = ?self.stock_code,
                            "Dropping tick for previous instrument"
                        );
                        None
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            raw = %text,
                            "Discarding undecodable stream message"
                        );
                        None
                    }
                }
            }
            (ConnectionState::Subscribed, TransportEvent::Error(reason)) => {
                tracing::error!(reason = %reason, "Stream transport error");
                self.transport.close(self.generation);
                self.state = ConnectionState::Closed;
                None
            }
            (ConnectionState::Subscribed, TransportEvent::Closed { code, reason }) => {
                tracing::info!(?code, reason = %reason, "Stream closed by remote");
                self.state = ConnectionState::Closed;
                None
            }
            (state, event) => {
                tracing::debug!(?state, ?event, "Ignoring transport event");
                None
            }
        }
    }

    /// Explicit close (host unmount or instrument switch). Late events for the
    /// closed connection become no-ops.
    pub fn close(&mut self) {
        match self.state {
            ConnectionState::Subscribed => {
                self.send_unsubscribe();
                self.transport.close(self.generation);
            }
            ConnectionState::Connecting => {
                self.transport.close(self.generation);
            }
            ConnectionState::Idle | ConnectionState::Closed => {}
        }
        if self.state != ConnectionState::Closed {
            tracing::info!(generation = self.generation, "Stream connection closed");
        }
        self.state = ConnectionState::Closed;
        self.generation += 1;
    }

    /// Move the live connection to another instrument without reconnecting.
    ///
    /// While `Subscribed` this sends `unsubscribe` for the old code, then
    /// `subscribe` for the new one. While `Connecting` only the code changes;
    /// the handshake on open picks it up. Idle or closed connections stay as
    /// they are.
    pub fn resubscribe(&mut self, stock_code: &str) {
        if self.stock_code.as_deref() == Some(stock_code) {
            return;
        }
        match self.state {
            ConnectionState::Subscribed => {
                self.send_unsubscribe();
                self.stock_code = Some(stock_code.to_string());
                self.send_subscribe();
            }
            ConnectionState::Connecting => {
                tracing::info!(stock_code = %stock_code, "Retargeting pending connection");
                self.stock_code = Some(stock_code.to_string());
            }
            ConnectionState::Idle | ConnectionState::Closed => {
                tracing::debug!(
                    stock_code = %stock_code,
                    state = ?self.state,
                    "No live connection to retarget"
                );
            }
        }
    }

    fn send_unsubscribe(&mut self) {
        let Some(code) = self.stock_code.as_deref() else {
            return;
        };
        match MessageOut::unsubscribe(code).to_json() {
            Ok(json) => {
                if let Err(e) = self.transport.send(self.generation, json) {
                    tracing::debug!(error = %e, "Unsubscribe not delivered");
                }
            }
            Err(e) => tracing::debug!(error = %e, "Failed to encode unsubscribe"),
        }
    }

    fn send_subscribe(&mut self) {
        let Some(code) = self.stock_code.clone() else {
            tracing::error!("Connection opened without an instrument code");
            self.transport.close(self.generation);
            self.state = ConnectionState::Closed;
            return;
        };

        let sent = MessageOut::subscribe(&code)
            .to_json()
            .map_err(AppError::from)
            .and_then(|json| self.transport.send(self.generation, json));

        match sent {
            Ok(()) => {
                tracing::info!(stock_code = %code, generation = self.generation, "Subscribed");
                self.state = ConnectionState::Subscribed;
            }
            Err(e) => {
                tracing::error!(error = %e, stock_code = %code, "Subscribe handshake failed");
                self.transport.close(self.generation);
                self.state = ConnectionState::Closed;
            }
        }
    }
}
