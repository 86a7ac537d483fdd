use std::collections::HashSet;

use crate::model::price_point::PricePoint;
use crate::model::snapshot::ConfigSnapshot;

/// Endpoint and instrument the stream should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    pub endpoint: String,
    pub stock_code: String,
}

/// What the widget must do after a configuration push.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    /// Instrument code differs from the previous snapshot.
    pub instrument_changed: bool,
    /// Replace buffer contents with these points.
    pub reseed: Option<Vec<PricePoint>>,
    /// Endpoint never opened before: open a fresh connection.
    pub open: Option<StreamTarget>,
    /// Endpoint already opened once: switch the subscription on the live
    /// connection instead of reconnecting.
    pub resubscribe: Option<StreamTarget>,
}

/// Holds the latest host configuration and decides, per push, whether the
/// buffer is reseeded and what the stream should do.
///
/// Repeat pushes for the same instrument code are idempotent: live ticks
/// survive host re-renders. Each endpoint is opened at most once per widget
/// lifetime; later instruments on that endpoint reuse the connection.
#[derive(Debug, Default)]
pub struct ConfigBridge {
    current: Option<ConfigSnapshot>,
    /// Code the stream was last pointed at. Cleared on instrument change.
    streamed_code: Option<String>,
    opened_endpoints: HashSet<String>,
}

impl ConfigBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, snapshot: ConfigSnapshot) -> ApplyOutcome {
        let first = self.current.is_none();
        let instrument_changed = self
            .current
            .as_ref()
            .is_some_and(|cur| cur.stock_code() != snapshot.stock_code());

        let reseed = if first {
            (!snapshot.initial_points().is_empty()).then(|| snapshot.initial_points().to_vec())
        } else if instrument_changed {
            Some(snapshot.initial_points().to_vec())
        } else {
            None
        };

        if instrument_changed {
            tracing::info!(
                from = ?self.current.as_ref().map(|c| c.stock_code().to_string()),
                to = %snapshot.stock_code(),
                "Instrument changed"
            );
            self.streamed_code = None;
        }

        let mut outcome = ApplyOutcome {
            instrument_changed,
            reseed,
            ..Default::default()
        };

        if let Some(endpoint) = snapshot.endpoint() {
            if self.streamed_code.as_deref() != Some(snapshot.stock_code()) {
                self.streamed_code = Some(snapshot.stock_code().to_string());
                let target = StreamTarget {
                    endpoint: endpoint.to_string(),
                    stock_code: snapshot.stock_code().to_string(),
                };
                if self.opened_endpoints.insert(endpoint.to_string()) {
                    outcome.open = Some(target);
                } else {
                    outcome.resubscribe = Some(target);
                }
            }
        }

        self.current = Some(snapshot);
        outcome
    }

    /// Latest snapshot, or `None` while not yet configured.
    pub fn current(&self) -> Option<&ConfigSnapshot> {
        self.current.as_ref()
    }
}
