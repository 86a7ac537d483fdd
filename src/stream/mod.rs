//! Streaming side of the widget: wire codec, connection state machine and
//! the websocket transport behind it.

pub mod connection;
pub mod wire;
pub mod ws;

pub use connection::{ConnectionState, StreamConnection, Transport};
pub use wire::{decode_tick, MessageOut, Tick};
pub use ws::WsTransport;
