//! The ws transport module opens the websocket connection of a negotiated session
//! and waits for the server to confirm it.
//!
//! It also provides the [`Writer`] through which every frame of a session is sent.
//!
//! ## Upgrade with [`UpgradeMode::Confirm`] :
//! ```text
//! CLIENT                                                 SERVER
//!│                                                      │
//!│   GET /socket.io/?EIO=4&transport=websocket&sid=...  │
//!│ ───────────────────────────────────────────────────► │
//!│  ◄─────────────────────────────────────────────────┘ │
//!│            HTTP 101 (WebSocket handshake)            │
//!│                                                      │
//!│  ◄─────────────────────────────────────────────────  │
//!│                   0{"sid":...}                       │ (open packet)
//! ```
//!
//! ## Upgrade with [`UpgradeMode::Probe`] :
//! ```text
//! CLIENT                                                 SERVER
//!│            HTTP 101 (WebSocket handshake)            │
//!│  ─────────────────────────────────────────────────►  │
//!│                         2probe                       │ (ping packet)
//!│  ◄─────────────────────────────────────────────────  │
//!│                         3probe                       │ (pong packet)
//!│  ─────────────────────────────────────────────────►  │
//!│                         5                            │ (upgrade packet)
//! ```

use bytes::Bytes;
use engineio_client_core::{OpenPacket, Packet, PacketKind, TransportType};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::Mutex,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{Message, Utf8Bytes},
};
use url::Url;

use crate::{
    config::{ClientConfig, UpgradeMode},
    errors::{ConfirmationError, TransportError, UpgradeError},
    handler::Handlers,
    session::Session,
    transport::engine_url,
};

const PROBE: &str = "probe";

/// Open a websocket connection for a negotiated session and wait for the server to confirm it.
///
/// The url is the one used for the handshake, the scheme is switched to `ws` or `wss`.
pub async fn upgrade(
    url: &Url,
    open: OpenPacket,
    handlers: Handlers,
    config: ClientConfig,
) -> Result<Session<MaybeTlsStream<TcpStream>>, UpgradeError> {
    let url = engine_url(url, TransportType::Websocket, Some(&open.sid));

    #[cfg(feature = "tracing")]
    tracing::debug!(sid = %open.sid, %url, "opening websocket connection");

    let (ws, _res) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| UpgradeError::ConnectFailed(Box::new(e)))?;
    confirm(ws, open, handlers, config).await
}

/// Wait for the server to confirm an opened websocket connection and bind it to a [`Session`].
///
/// If the confirmation fails, the connection is closed before returning the error.
pub async fn confirm<S>(
    mut ws: WebSocketStream<S>,
    open: OpenPacket,
    handlers: Handlers,
    config: ClientConfig,
) -> Result<Session<S>, UpgradeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let res = match config.upgrade {
        UpgradeMode::Confirm => expect_packet(&mut ws, PacketKind::Open).await.map(drop),
        UpgradeMode::Probe => probe_handshake(&mut ws).await,
    };

    if let Err(e) = res {
        #[cfg(feature = "tracing")]
        tracing::debug!(sid = %open.sid, "upgrade not confirmed: {e}");
        ws.close(None).await.ok();
        return Err(e.into());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(sid = %open.sid, "websocket upgrade confirmed");

    Ok(Session::new(ws, open, handlers, config))
}

async fn probe_handshake<S>(ws: &mut WebSocketStream<S>) -> Result<(), ConfirmationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    ws.send(into_ws_message(Packet::new(PacketKind::Ping, PROBE)))
        .await
        .map_err(|e| ConfirmationError::Write(Box::new(e)))?;
    let pong = expect_packet(ws, PacketKind::Pong).await?;
    if pong.payload != PROBE {
        return Err(ConfirmationError::UnexpectedPacket(pong.kind));
    }
    ws.send(into_ws_message(Packet::empty(PacketKind::Upgrade)))
        .await
        .map_err(|e| ConfirmationError::Write(Box::new(e)))?;
    Ok(())
}

/// Read exactly one frame and check that it is a packet of the given kind.
async fn expect_packet<S>(
    ws: &mut WebSocketStream<S>,
    kind: PacketKind,
) -> Result<Packet, ConfirmationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let data: Bytes = match ws.next().await {
        Some(Ok(Message::Text(text))) => text.into(),
        Some(Ok(Message::Close(_))) | None => return Err(ConfirmationError::Closed),
        Some(Ok(_)) => return Err(ConfirmationError::UnexpectedFrame),
        Some(Err(e)) => return Err(ConfirmationError::Read(Box::new(e))),
    };
    let packet = Packet::decode(data)?;
    if packet.kind != kind {
        return Err(ConfirmationError::UnexpectedPacket(packet.kind));
    }
    Ok(packet)
}

/// Packets are sent as text frames. A payload that is not valid utf8 is sent as a binary frame.
fn into_ws_message(packet: Packet) -> Message {
    let data = packet.encode();
    match Utf8Bytes::try_from(data.clone()) {
        Ok(text) => Message::Text(text),
        Err(_) => Message::Binary(data),
    }
}

/// The write half of a session connection.
///
/// Every frame goes through it so that only one frame is written at a time.
pub(crate) struct Writer<S> {
    sink: Mutex<SplitSink<WebSocketStream<S>, Message>>,
}

impl<S> Writer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(sink: SplitSink<WebSocketStream<S>, Message>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Write and flush one packet.
    pub(crate) async fn send(&self, packet: Packet) -> Result<(), TransportError> {
        let msg = into_ws_message(packet);
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| TransportError::WriteFailed(Box::new(e)))
    }

    /// Send a websocket close frame. Errors are ignored, the connection is released anyway.
    pub(crate) async fn close(&self) {
        self.sink.lock().await.close().await.ok();
    }
}
