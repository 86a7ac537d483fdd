mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use common::{point, snapshot};
use realtime_chart::event::{TransportEvent, WidgetEvent};
use realtime_chart::stream::{ConnectionState, Transport, WsTransport};
use realtime_chart::{ChartWidget, FrameLatch};

#[tokio::test]
async fn subscribes_receives_ticks_and_unsubscribes_on_teardown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let mut texts = Vec::new();
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    let text = text.to_string();
                    if text.contains(r#""type":"subscribe""#) {
                        ws.send(Message::Text(
                            r#"{"stock_code":"005930","price":70100,"time":"09:02"}"#.into(),
                        ))
                        .await
                        .unwrap();
                    }
                    texts.push(text);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        texts
    });

    let (tx, mut rx) = mpsc::channel::<WidgetEvent>(16);
    let transport = WsTransport::new(tx, Duration::from_secs(5));
    let mut widget = ChartWidget::new(transport, FrameLatch::new());
    widget.apply(snapshot(
        "005930",
        70000.0,
        vec![point("09:00", 69000.0)],
        Some(&format!("ws://{}", addr)),
    ));

    tokio::time::timeout(Duration::from_secs(5), async {
        while widget.buffer().len() < 2 {
            let evt = rx.recv().await.unwrap();
            widget.handle(evt);
        }
    })
    .await
    .unwrap();

    assert_eq!(widget.connection_state(), ConnectionState::Subscribed);
    assert_eq!(widget.buffer().last(), Some(&point("09:02", 70100.0)));

    widget.teardown();
    let texts = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        texts,
        vec![
            r#"{"type":"subscribe","stock_code":"005930"}"#.to_string(),
            r#"{"type":"unsubscribe","stock_code":"005930"}"#.to_string(),
        ]
    );
}

#[tokio::test]
async fn unreachable_endpoint_reports_error() {
    // bind then drop to get a port nobody listens on
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let (tx, mut rx) = mpsc::channel::<WidgetEvent>(4);
    let mut transport = WsTransport::new(tx, Duration::from_secs(5));
    transport.connect(&format!("ws://{}", addr), 7).unwrap();

    let evt = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    match evt {
        WidgetEvent::Transport(notice) => {
            assert_eq!(notice.generation, 7);
            assert!(matches!(notice.event, TransportEvent::Error(_)));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn close_before_handshake_reports_nothing() {
    tokio_test::block_on(async {
        // accepts TCP via the backlog but never answers the upgrade
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, mut rx) = mpsc::channel::<WidgetEvent>(4);
        let mut transport = WsTransport::new(tx, Duration::from_secs(5));
        transport.connect(&format!("ws://{}", addr), 1).unwrap();
        assert_eq!(transport.active_generation(), Some(1));
        transport.close(1);
        assert_eq!(transport.active_generation(), None);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
        drop(listener);
    });
}
