use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use super::connection::Transport;
use crate::error::AppError;
use crate::event::{TransportEvent, TransportNotice, WidgetEvent};

enum Command {
    Send(String),
    Close,
}

struct ActiveConnection {
    generation: u64,
    cmd_tx: mpsc::Sender<Command>,
    handle: JoinHandle<()>,
}

/// `tokio-tungstenite` transport. Each connection runs on its own task and
/// reports back through the widget's event channel.
pub struct WsTransport {
    event_tx: mpsc::Sender<WidgetEvent>,
    connect_timeout: Duration,
    active: Option<ActiveConnection>,
}

impl WsTransport {
    pub fn new(event_tx: mpsc::Sender<WidgetEvent>, connect_timeout: Duration) -> Self {
        Self {
            event_tx,
            connect_timeout,
            active: None,
        }
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.generation)
    }
}

impl Transport for WsTransport {
    fn connect(&mut self, endpoint: &str, generation: u64) -> Result<(), AppError> {
        if let Some(prev) = self.active.as_ref().map(|a| a.generation) {
            self.close(prev);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Transport(format!("no async runtime: {}", e)))?;

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let handle = runtime.spawn(run_connection(
            endpoint.to_string(),
            generation,
            self.event_tx.clone(),
            cmd_rx,
            self.connect_timeout,
        ));
        self.active = Some(ActiveConnection {
            generation,
            cmd_tx,
            handle,
        });
        Ok(())
    }

    fn send(&mut self, generation: u64, text: String) -> Result<(), AppError> {
        match &self.active {
            Some(active) if active.generation == generation => active
                .cmd_tx
                .try_send(Command::Send(text))
                .map_err(|e| match e {
                    mpsc::error::TrySendError::Full(_) => {
                        AppError::Transport("command channel full".to_string())
                    }
                    mpsc::error::TrySendError::Closed(_) => {
                        AppError::Transport("connection task has exited".to_string())
                    }
                }),
            _ => Err(AppError::Transport("not connected".to_string())),
        }
    }

    fn close(&mut self, generation: u64) {
        let matches = self
            .active
            .as_ref()
            .is_some_and(|a| a.generation == generation);
        if !matches {
            return;
        }
        if let Some(active) = self.active.take() {
            if active.cmd_tx.try_send(Command::Close).is_err() {
                // Task is gone or wedged; nothing left to close gracefully.
                active.handle.abort();
            }
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
        }
    }
}

async fn emit(event_tx: &mpsc::Sender<WidgetEvent>, generation: u64, event: TransportEvent) {
    let notice = TransportNotice::new(generation, event);
    if event_tx.send(WidgetEvent::Transport(notice)).await.is_err() {
        tracing::debug!(generation, "Widget event channel closed");
    }
}

async fn run_connection(
    endpoint: String,
    generation: u64,
    event_tx: mpsc::Sender<WidgetEvent>,
    mut cmd_rx: mpsc::Receiver<Command>,
    connect_timeout: Duration,
) {
    let connect = tokio_tungstenite::connect_async(endpoint.as_str());
    let connected = tokio::select! {
        res = tokio::time::timeout(connect_timeout, connect) => res,
        _ = cmd_rx.recv() => {
            tracing::debug!(generation, "Connect abandoned by close request");
            return;
        }
    };

    let ws_stream = match connected {
        Ok(Ok((ws_stream, _resp))) => ws_stream,
        Ok(Err(e)) => {
            emit(&event_tx, generation, TransportEvent::Error(e.to_string())).await;
            return;
        }
        Err(_) => {
            emit(
                &event_tx,
                generation,
                TransportEvent::Error(format!(
                    "connect timed out after {}ms",
                    connect_timeout.as_millis()
                )),
            )
            .await;
            return;
        }
    };

    emit(&event_tx, generation, TransportEvent::Opened).await;
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        emit(&event_tx, generation, TransportEvent::Message(text)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        let closed = TransportEvent::Closed { code: Some(code), reason };
                        emit(&event_tx, generation, closed).await;
                        return;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong are answered by tungstenite; binary frames carry no ticks.
                    }
                    Some(Err(e)) => {
                        emit(&event_tx, generation, TransportEvent::Error(e.to_string())).await;
                        return;
                    }
                    None => {
                        emit(
                            &event_tx,
                            generation,
                            TransportEvent::Closed {
                                code: None,
                                reason: "stream ended".to_string(),
                            },
                        )
                        .await;
                        return;
                    }
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send(text)) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            emit(&event_tx, generation, TransportEvent::Error(e.to_string())).await;
                            return;
                        }
                    }
                    Some(Command::Close) | None => {
                        let _ = sink
                            .send(Message::Close(Some(CloseFrame {
                                code: CloseCode::Normal,
                                reason: "client teardown".into(),
                            })))
                            .await;
                        return;
                    }
                }
            }
        }
    }
}

fn extract_close(frame: Option<&CloseFrame<'_>>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1005, "no close frame".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_close_with_frame() {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        };
        assert_eq!(extract_close(Some(&frame)), (1000, "bye".to_string()));
    }

    #[test]
    fn extract_close_without_frame() {
        assert_eq!(extract_close(None).0, 1005);
    }

    #[test]
    fn send_without_connection_fails() {
        let (tx, _rx) = mpsc::channel(4);
        let mut transport = WsTransport::new(tx, Duration::from_secs(1));
        assert!(matches!(
            transport.send(1, "{}".to_string()),
            Err(AppError::Transport(_))
        ));
        transport.close(1);
        assert_eq!(transport.active_generation(), None);
    }

    #[test]
    fn connect_outside_runtime_is_a_transport_error() {
        let (tx, _rx) = mpsc::channel(4);
        let mut transport = WsTransport::new(tx, Duration::from_secs(1));
        assert!(matches!(
            transport.connect("ws://127.0.0.1:1", 1),
            Err(AppError::Transport(_))
        ));
    }
}
