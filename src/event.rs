use crate::model::snapshot::ConfigSnapshot;

/// What the duplex transport reports back about one connection.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Error(String),
    Closed { code: Option<u16>, reason: String },
}

/// A transport event tagged with the connection generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportNotice {
    pub generation: u64,
    pub event: TransportEvent,
}

impl TransportNotice {
    pub fn new(generation: u64, event: TransportEvent) -> Self {
        Self { generation, event }
    }
}

/// Everything the widget reacts to, delivered one at a time on the UI thread.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// Host frame pushed a configuration snapshot.
    Configure(ConfigSnapshot),
    Transport(TransportNotice),
    /// Host frame unmounted the widget.
    Teardown,
}
