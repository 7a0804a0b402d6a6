//! Full client flow against a local server: polling handshake over a real http
//! connection, websocket upgrade, event exchange and close.
use engineio_client::{ClientBuilder, CloseReason};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::mpsc,
};
use tokio_tungstenite::{
    WebSocketStream,
    tungstenite::{
        Message,
        handshake::server::{ErrorResponse, Request, Response},
    },
};

const OPEN: &str = r#"0{"sid":"abc123","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

async fn read_http_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the end of the request");
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).unwrap()
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return text.as_str().to_owned(),
            Message::Close(_) => panic!("connection closed"),
            _ => continue,
        }
    }
}

async fn serve(listener: TcpListener) {
    let (mut stream, _) = listener.accept().await.unwrap();
    let req = read_http_request(&mut stream).await;
    assert!(
        req.starts_with("GET /socket.io/?EIO=4&transport=polling HTTP/1.1\r\n"),
        "{req}"
    );
    let res = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: text/plain; charset=UTF-8\r\ncontent-length: {}\r\n\r\n{OPEN}",
        OPEN.len()
    );
    stream.write_all(res.as_bytes()).await.unwrap();

    let (stream, _) = listener.accept().await.unwrap();
    let check_uri = |req: &Request, res: Response| {
        assert_eq!(
            req.uri().query(),
            Some("EIO=4&transport=websocket&sid=abc123")
        );
        Ok::<_, ErrorResponse>(res)
    };
    let mut ws = tokio_tungstenite::accept_hdr_async(stream, check_uri)
        .await
        .unwrap();

    ws.send(Message::text(OPEN)).await.unwrap();
    assert_eq!(next_text(&mut ws).await, "40");
    ws.send(Message::text(r#"40{"sid":"ns1"}"#)).await.unwrap();
    ws.send(Message::text(r#"42["chat","hi"]"#)).await.unwrap();
    assert_eq!(next_text(&mut ws).await, r#"42["reply",1]"#);
    ws.send(Message::text("1")).await.unwrap();
}

#[tokio::test]
async fn connect_and_exchange_events() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = ClientBuilder::new(format!("http://{addr}"))
        .on("chat", move |data: Value| tx.send(data).unwrap())
        .connect()
        .await
        .unwrap();
    assert_eq!(session.sid(), "abc123");
    assert_eq!(session.open_packet().max_payload, Some(1000000));

    let emitter = session.emitter();
    let handle = tokio::spawn(session.run());

    assert_eq!(rx.recv().await.unwrap(), json!("hi"));
    emitter.emit("reply", json!(1)).await.unwrap();

    assert_eq!(handle.await.unwrap().unwrap(), CloseReason::Close);
    server.await.unwrap();
}
