use std::{sync::atomic::Ordering, time::Duration};

use engineio_client::{ClientConfig, CloseReason, HeartbeatMode, TransportError};
use futures_util::SinkExt;
use serde_json::{Value, json};
use tokio::{sync::mpsc, time::Instant};

use fixture::{create_session, next_text, open_packet, quiet_config, send};

#[tokio::test]
async fn ping_is_answered_with_a_single_pong() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let handle = tokio::spawn(session.run());

    send(&mut srv, "2").await;
    assert_eq!(next_text(&mut srv).await.as_deref(), Some("3"));

    send(&mut srv, "1").await;
    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Close);
    // nothing but the close frame after the pong
    assert_eq!(next_text(&mut srv).await, None);
}

#[tokio::test]
async fn ping_payload_is_echoed() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let handle = tokio::spawn(session.run());

    send(&mut srv, "2probe").await;
    assert_eq!(next_text(&mut srv).await.as_deref(), Some("3probe"));

    send(&mut srv, "1").await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn events_are_dispatched_in_order() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    session.handlers().on("chat", move |data: Value| tx.send(data).unwrap());
    let handle = tokio::spawn(session.run());

    send(&mut srv, r#"42["chat","first"]"#).await;
    send(&mut srv, r#"42["chat",{"n":2}]"#).await;
    send(&mut srv, r#"42["chat"]"#).await;
    send(&mut srv, r#"42["chat",3,"ignored"]"#).await;

    assert_eq!(rx.recv().await.unwrap(), json!("first"));
    assert_eq!(rx.recv().await.unwrap(), json!({ "n": 2 }));
    assert_eq!(rx.recv().await.unwrap(), Value::Null);
    assert_eq!(rx.recv().await.unwrap(), json!(3));

    send(&mut srv, "1").await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_event_is_ignored() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    session.handlers().on("chat", move |data: Value| tx.send(data).unwrap());
    let handle = tokio::spawn(session.run());

    send(&mut srv, r#"42["unsubscribed_event",42]"#).await;
    send(&mut srv, r#"42["chat",1]"#).await;
    assert_eq!(rx.recv().await.unwrap(), json!(1));

    send(&mut srv, "1").await;
    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Close);
    assert!(rx.try_recv().is_err());
    // no frame was written in response to the unknown event
    assert_eq!(next_text(&mut srv).await, None);
}

#[tokio::test]
async fn malformed_frames_are_skipped() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    session.handlers().on("chat", move |data: Value| tx.send(data).unwrap());
    let handle = tokio::spawn(session.run());

    send(&mut srv, r#"42["chat",1]"#).await;
    send(&mut srv, "9garbage").await;
    send(&mut srv, "").await;
    send(&mut srv, r#"42["chat""#).await;
    send(&mut srv, r#"42[1,2]"#).await;
    send(&mut srv, r#"42{"event":"chat"}"#).await;
    send(&mut srv, r#"42["chat",2]"#).await;

    assert_eq!(rx.recv().await.unwrap(), json!(1));
    assert_eq!(rx.recv().await.unwrap(), json!(2));

    send(&mut srv, "1").await;
    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Close);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unexpected_packets_are_ignored() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    session.handlers().on("chat", move |data: Value| tx.send(data).unwrap());
    let handle = tokio::spawn(session.run());

    let open = format!("0{}", serde_json::to_string(&open_packet(25000)).unwrap());
    send(&mut srv, &open).await;
    send(&mut srv, "5").await;
    send(&mut srv, "4plain text").await;
    send(&mut srv, r#"40{"sid":"ns"}"#).await;
    send(&mut srv, r#"44{"message":"refused"}"#).await;
    send(&mut srv, r#"42["chat",1]"#).await;
    assert_eq!(rx.recv().await.unwrap(), json!(1));

    send(&mut srv, "6").await;
    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Noop);
}

#[tokio::test]
async fn server_disconnect_ends_session() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let handle = tokio::spawn(session.run());

    send(&mut srv, "41").await;
    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Disconnect);
}

#[tokio::test]
async fn websocket_close_ends_session() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let handle = tokio::spawn(session.run());

    srv.close(None).await.unwrap();
    assert_eq!(
        handle.await.unwrap().unwrap(),
        CloseReason::TransportClose
    );
}

#[tokio::test]
async fn pong_does_not_end_session() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    assert!(session.last_pong().is_none());
    let (tx, mut rx) = mpsc::unbounded_channel();
    session.handlers().on("chat", move |data: Value| tx.send(data).unwrap());
    let handle = tokio::spawn(session.run());

    send(&mut srv, "3").await;
    send(&mut srv, r#"42["chat",1]"#).await;
    assert_eq!(rx.recv().await.unwrap(), json!(1));

    send(&mut srv, "1").await;
    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Close);
}

#[tokio::test]
async fn namespace_connect_is_sent_first() {
    let config = ClientConfig::builder()
        .heartbeat(HeartbeatMode::Disabled)
        .build();
    let (session, mut srv, _) = create_session(config, 25000).await;
    let handle = tokio::spawn(session.run());

    assert_eq!(next_text(&mut srv).await.as_deref(), Some("40"));

    send(&mut srv, "1").await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn emit_event() {
    let (session, mut srv, _) = create_session(quiet_config(), 25000).await;
    let emitter = session.emitter();
    let handle = tokio::spawn(session.run());

    emitter.emit("hello", json!({ "a": 1 })).await.unwrap();
    assert_eq!(
        next_text(&mut srv).await.as_deref(),
        Some(r#"42["hello",{"a":1}]"#)
    );
    emitter.close().await.unwrap();
    assert_eq!(next_text(&mut srv).await.as_deref(), Some("1"));

    send(&mut srv, "1").await;
    handle.await.unwrap().unwrap();
    assert!(matches!(
        emitter.emit("hello", Value::Null).await,
        Err(TransportError::WriteFailed(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn heartbeat_runs_while_reader_waits() {
    let config = ClientConfig::builder().connect_namespace(false).build();
    let (session, mut srv, _) = create_session(config, 10).await;
    let handle = tokio::spawn(session.run());

    let start = Instant::now();
    let deadline = tokio::time::sleep(Duration::from_millis(100));
    tokio::pin!(deadline);
    let mut pings = 0;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            msg = next_text(&mut srv) => {
                assert_eq!(msg.as_deref(), Some("2"));
                pings += 1;
            }
        }
    }
    let elapsed = start.elapsed().as_millis() as usize;
    assert!(pings >= elapsed / 10 - 1, "{pings} pings in {elapsed}ms");

    send(&mut srv, "1").await;
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn pong_heartbeat_mode() {
    let config = ClientConfig::builder()
        .heartbeat(HeartbeatMode::Pong)
        .connect_namespace(false)
        .build();
    let (session, mut srv, _) = create_session(config, 10).await;
    let handle = tokio::spawn(session.run());

    assert_eq!(next_text(&mut srv).await.as_deref(), Some("3"));
    assert_eq!(next_text(&mut srv).await.as_deref(), Some("3"));

    send(&mut srv, "1").await;
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn no_write_after_transport_failure() {
    let config = ClientConfig::builder().connect_namespace(false).build();
    let (session, mut srv, tap) = create_session(config, 10).await;
    let handle = tokio::spawn(session.run());

    assert_eq!(next_text(&mut srv).await.as_deref(), Some("2"));
    assert_eq!(next_text(&mut srv).await.as_deref(), Some("2"));
    drop(srv);

    assert!(handle.await.unwrap().is_err());
    let count = tap.writes.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(tap.writes.load(Ordering::SeqCst), count);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_write_failure_ends_session() {
    let config = ClientConfig::builder().connect_namespace(false).build();
    let (session, _srv, tap) = create_session(config, 20).await;
    tap.broken.store(true, Ordering::SeqCst);

    // nothing is ever sent by the server, only the heartbeat can end the session
    let res = tokio::time::timeout(Duration::from_millis(100), session.run())
        .await
        .expect("session should end on the first heartbeat");
    assert!(matches!(res, Err(TransportError::WriteFailed(_))));
}
