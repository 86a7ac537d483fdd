//! Real-time price chart widget core.
//!
//! A host frame pushes configuration snapshots; the widget keeps a bounded
//! buffer of recent prices fed by a websocket tick stream and hands the host a
//! declarative plot description after every change.

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod model;
pub mod presenter;
pub mod stream;
pub mod ui;
pub mod widget;

pub use bridge::ConfigBridge;
pub use buffer::{PointBuffer, POINT_CAPACITY};
pub use host::{FrameLatch, HostFrame};
pub use model::price_point::PricePoint;
pub use model::snapshot::ConfigSnapshot;
pub use presenter::{ChartPresenter, PlotDescription, RenderFrame};
pub use stream::{ConnectionState, StreamConnection, Transport};
pub use widget::ChartWidget;
