use crate::bridge::ConfigBridge;
use crate::buffer::PointBuffer;
use crate::error::AppError;
use crate::event::{TransportNotice, WidgetEvent};
use crate::host::HostFrame;
use crate::model::snapshot::ConfigSnapshot;
use crate::presenter::{ChartPresenter, RenderFrame};
use crate::stream::connection::{ConnectionState, StreamConnection, Transport};

/// One mounted chart. Owns its buffer, configuration and the single stream
/// connection; every event is handled to completion before the next one.
pub struct ChartWidget<T: Transport, H: HostFrame> {
    buffer: PointBuffer,
    bridge: ConfigBridge,
    connection: StreamConnection<T>,
    presenter: ChartPresenter,
    host: H,
    mounted: bool,
    torn_down: bool,
    ticks_received: u64,
}

impl<T: Transport, H: HostFrame> ChartWidget<T, H> {
    pub fn new(transport: T, host: H) -> Self {
        Self::with_presenter(transport, host, ChartPresenter::default())
    }

    pub fn with_presenter(transport: T, host: H, presenter: ChartPresenter) -> Self {
        Self {
            buffer: PointBuffer::new(),
            bridge: ConfigBridge::new(),
            connection: StreamConnection::new(transport),
            presenter,
            host,
            mounted: false,
            torn_down: false,
            ticks_received: 0,
        }
    }

    /// Signal readiness and show the loading placeholder. Idempotent.
    pub fn mount(&mut self) {
        if self.mounted || self.torn_down {
            return;
        }
        self.mounted = true;
        self.host.component_ready();
        self.refresh();
    }

    pub fn handle(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Configure(snapshot) => self.apply(snapshot),
            WidgetEvent::Transport(notice) => self.on_transport(notice),
            WidgetEvent::Teardown => self.teardown(),
        }
    }

    pub fn apply(&mut self, snapshot: ConfigSnapshot) {
        if self.torn_down {
            tracing::debug!("Ignoring configuration after teardown");
            return;
        }
        self.mount();

        let outcome = self.bridge.apply(snapshot);
        if let Some(seed) = outcome.reseed.as_deref() {
            self.buffer.reset(seed);
        }

        let retargeted = match outcome.resubscribe.as_ref() {
            Some(target)
                if self.connection.is_active()
                    && self.connection.endpoint() == Some(target.endpoint.as_str()) =>
            {
                self.connection.resubscribe(&target.stock_code);
                true
            }
            Some(target) => {
                tracing::warn!(
                    endpoint = %target.endpoint,
                    stock_code = %target.stock_code,
                    "Endpoint was already opened once; not reopening"
                );
                false
            }
            None => false,
        };
        if outcome.instrument_changed && !retargeted && self.connection.is_active() {
            self.connection.close();
        }
        if let Some(req) = outcome.open {
            if let Err(e) = self.connection.open(&req.endpoint, &req.stock_code) {
                tracing::warn!(error = %e, "Chart keeps rendering without live data");
            }
        }
        self.refresh();
    }

    /// Parse a raw host push and apply it. Invalid pushes leave the widget
    /// untouched.
    pub fn apply_json(&mut self, raw: &str) -> Result<(), AppError> {
        let snapshot = ConfigSnapshot::from_json(raw)?;
        self.apply(snapshot);
        Ok(())
    }

    pub fn on_transport(&mut self, notice: TransportNotice) {
        if self.torn_down {
            tracing::debug!(generation = notice.generation, "Late transport event after teardown");
            return;
        }
        if let Some(point) = self.connection.handle(notice) {
            self.buffer.append(point);
            self.ticks_received += 1;
            self.refresh();
        }
    }

    /// Host unmount: close the transport synchronously, then go inert.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.connection.close();
        self.torn_down = true;
        tracing::info!(ticks = self.ticks_received, "Chart widget torn down");
    }

    fn refresh(&mut self) {
        let points = self.buffer.snapshot();
        let frame = self.presenter.present(self.bridge.current(), &points);
        self.host.render(&frame);
        self.host.set_frame_height(frame.frame_height());
    }

    /// Current plot description without notifying the host.
    pub fn current_frame(&self) -> RenderFrame {
        self.presenter
            .present(self.bridge.current(), &self.buffer.snapshot())
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    pub fn current_config(&self) -> Option<&ConfigSnapshot> {
        self.bridge.current()
    }

    pub fn connection(&self) -> &StreamConnection<T> {
        &self.connection
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn ticks_received(&self) -> u64 {
        self.ticks_received
    }
}
