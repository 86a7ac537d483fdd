mod common;

use common::{point, tick_json, tick_json_for, RecordingTransport};
use realtime_chart::event::{TransportEvent, TransportNotice};
use realtime_chart::stream::{ConnectionState, StreamConnection};

fn notice(generation: u64, event: TransportEvent) -> TransportNotice {
    TransportNotice::new(generation, event)
}

fn subscribed() -> (StreamConnection<RecordingTransport>, u64) {
    let mut conn = StreamConnection::new(RecordingTransport::default());
    let gen = conn.open("ws://x", "005930").unwrap();
    conn.handle(notice(gen, TransportEvent::Opened));
    assert_eq!(conn.state(), ConnectionState::Subscribed);
    (conn, gen)
}

#[test]
fn open_moves_idle_to_connecting_without_sending() {
    let mut conn = StreamConnection::new(RecordingTransport::default());
    assert_eq!(conn.state(), ConnectionState::Idle);

    let gen = conn.open("ws://x", "005930").unwrap();
    assert_eq!(conn.state(), ConnectionState::Connecting);
    assert_eq!(conn.transport().connects, vec![("ws://x".to_string(), gen)]);
    assert!(conn.transport().sent.is_empty());
    assert_eq!(conn.stock_code(), Some("005930"));
}

#[test]
fn subscribe_is_sent_once_on_open() {
    let (mut conn, gen) = subscribed();
    assert_eq!(
        conn.transport().sent_texts(),
        vec![r#"{"type":"subscribe","stock_code":"005930"}"#]
    );

    // duplicate open notification must not resend the handshake
    conn.handle(notice(gen, TransportEvent::Opened));
    assert_eq!(conn.transport().subscribe_count(), 1);
    assert_eq!(conn.state(), ConnectionState::Subscribed);
}

#[test]
fn error_while_connecting_closes_without_subscribing() {
    let mut conn = StreamConnection::new(RecordingTransport::default());
    let gen = conn.open("ws://x", "005930").unwrap();
    conn.handle(notice(gen, TransportEvent::Error("refused".to_string())));

    assert_eq!(conn.state(), ConnectionState::Closed);
    assert_eq!(conn.transport().closes, vec![gen]);

    conn.handle(notice(gen, TransportEvent::Opened));
    assert_eq!(conn.transport().subscribe_count(), 0);
}

#[test]
fn inbound_tick_is_decoded_for_live_connection() {
    let (mut conn, gen) = subscribed();
    let tick = conn.handle(notice(gen, TransportEvent::Message(tick_json("09:01", 69100.0))));
    assert_eq!(tick, Some(point("09:01", 69100.0)));
}

#[test]
fn undecodable_message_keeps_connection_subscribed() {
    let (mut conn, gen) = subscribed();
    for raw in [r#"{"foo":1}"#, "not json", r#"{"price":1}"#, r#"{"time":"09:00"}"#] {
        assert_eq!(conn.handle(notice(gen, TransportEvent::Message(raw.to_string()))), None);
        assert_eq!(conn.state(), ConnectionState::Subscribed);
    }
}

#[test]
fn messages_with_any_type_tag_are_ticks() {
    let (mut conn, gen) = subscribed();
    let raw = r#"{"type":"heartbeat","price":"70000","time":"09:05"}"#;
    assert_eq!(
        conn.handle(notice(gen, TransportEvent::Message(raw.to_string()))),
        Some(point("09:05", 70000.0))
    );
}

#[test]
fn transport_error_while_subscribed_closes() {
    let (mut conn, gen) = subscribed();
    conn.handle(notice(gen, TransportEvent::Error("reset".to_string())));
    assert_eq!(conn.state(), ConnectionState::Closed);

    let late = conn.handle(notice(gen, TransportEvent::Message(tick_json("09:02", 1.0))));
    assert_eq!(late, None);
}

#[test]
fn remote_close_while_subscribed_closes() {
    let (mut conn, gen) = subscribed();
    conn.handle(notice(
        gen,
        TransportEvent::Closed {
            code: Some(1000),
            reason: "bye".to_string(),
        },
    ));
    assert_eq!(conn.state(), ConnectionState::Closed);
    assert_eq!(conn.transport().subscribe_count(), 1);
}

#[test]
fn explicit_close_while_connecting_sends_nothing() {
    let mut conn = StreamConnection::new(RecordingTransport::default());
    let gen = conn.open("ws://x", "005930").unwrap();
    conn.close();

    assert_eq!(conn.state(), ConnectionState::Closed);
    assert_eq!(conn.transport().closes, vec![gen]);

    // open event racing the close is stale
    conn.handle(notice(gen, TransportEvent::Opened));
    assert!(conn.transport().sent.is_empty());
    assert_eq!(conn.state(), ConnectionState::Closed);
}

#[test]
fn explicit_close_while_subscribed_unsubscribes_first() {
    let (mut conn, gen) = subscribed();
    conn.close();
    assert_eq!(
        conn.transport().sent_texts(),
        vec![
            r#"{"type":"subscribe","stock_code":"005930"}"#,
            r#"{"type":"unsubscribe","stock_code":"005930"}"#,
        ]
    );
    assert_eq!(conn.transport().closes, vec![gen]);
    assert_eq!(conn.state(), ConnectionState::Closed);
}

#[test]
fn events_from_a_previous_generation_are_ignored() {
    let mut conn = StreamConnection::new(RecordingTransport::default());
    let first = conn.open("ws://x", "005930").unwrap();
    let second = conn.open("ws://x", "000660").unwrap();
    assert!(second > first);
    assert_eq!(conn.transport().closes, vec![first]);

    conn.handle(notice(first, TransportEvent::Opened));
    assert!(conn.transport().sent.is_empty());
    assert_eq!(conn.state(), ConnectionState::Connecting);

    conn.handle(notice(second, TransportEvent::Opened));
    assert_eq!(
        conn.transport().sent_texts(),
        vec![r#"{"type":"subscribe","stock_code":"000660"}"#]
    );
}

#[test]
fn reopen_after_close_uses_fresh_generation() {
    let (mut conn, gen) = subscribed();
    conn.handle(notice(gen, TransportEvent::Error("reset".to_string())));
    let next = conn.open("ws://x", "005930").unwrap();
    assert_ne!(next, gen);
    assert_eq!(conn.state(), ConnectionState::Connecting);
    assert_eq!(conn.transport().connects.len(), 2);
}

#[test]
fn connect_failure_is_reported_and_closes() {
    let mut conn = StreamConnection::new(RecordingTransport::failing_connect());
    assert!(conn.open("ws://x", "005930").is_err());
    assert_eq!(conn.state(), ConnectionState::Closed);
}

#[test]
fn failed_handshake_send_closes() {
    let mut conn = StreamConnection::new(RecordingTransport::failing_send());
    let gen = conn.open("ws://x", "005930").unwrap();
    conn.handle(notice(gen, TransportEvent::Opened));
    assert_eq!(conn.state(), ConnectionState::Closed);
    assert_eq!(conn.transport().closes, vec![gen]);
}

#[test]
fn events_before_any_open_are_ignored() {
    let mut conn = StreamConnection::new(RecordingTransport::default());
    assert_eq!(
        conn.handle(notice(0, TransportEvent::Message(tick_json("09:00", 1.0)))),
        None
    );
    assert_eq!(conn.state(), ConnectionState::Idle);
}

#[test]
fn resubscribe_switches_instrument_on_live_connection() {
    let (mut conn, gen) = subscribed();
    conn.resubscribe("000660");

    assert_eq!(conn.state(), ConnectionState::Subscribed);
    assert_eq!(conn.generation(), gen);
    assert_eq!(conn.stock_code(), Some("000660"));
    assert_eq!(
        conn.transport().sent_texts(),
        vec![
            r#"{"type":"subscribe","stock_code":"005930"}"#,
            r#"{"type":"unsubscribe","stock_code":"005930"}"#,
            r#"{"type":"subscribe","stock_code":"000660"}"#,
        ]
    );
    assert!(conn.transport().closes.is_empty());
}

#[test]
fn resubscribe_to_current_code_sends_nothing() {
    let (mut conn, _) = subscribed();
    conn.resubscribe("005930");
    assert_eq!(conn.transport().sent.len(), 1);
}

#[test]
fn ticks_tagged_for_previous_instrument_are_dropped() {
    let (mut conn, gen) = subscribed();
    conn.resubscribe("000660");

    let stale = conn.handle(notice(gen, TransportEvent::Message(tick_json("09:01", 1.0))));
    assert_eq!(stale, None);

    let fresh = conn.handle(notice(
        gen,
        TransportEvent::Message(tick_json_for("000660", "09:01", 2.0)),
    ));
    assert_eq!(fresh, Some(point("09:01", 2.0)));
}

#[test]
fn resubscribe_on_closed_connection_does_nothing() {
    let (mut conn, gen) = subscribed();
    conn.handle(notice(gen, TransportEvent::Error("reset".to_string())));
    conn.resubscribe("000660");
    assert_eq!(conn.state(), ConnectionState::Closed);
    assert_eq!(conn.transport().sent.len(), 1);
    assert_eq!(conn.transport().connects.len(), 1);
}
