//! ## A [`Session`] owns an upgraded websocket connection
//!
//! [`Session::run`] reads the connection until the session ends. While it runs:
//! * a heartbeat job writes a heartbeat packet every ping interval,
//! * ping packets from the server are answered right away,
//! * socket.io events are dispatched to the [`Handlers`] in the order they are received,
//! * frames that cannot be decoded are skipped.
//!
//! The session ends when the server sends a close, noop or socket.io disconnect packet,
//! when the websocket is closed, or on the first read or write error.
//! The heartbeat job is always stopped before the connection is closed.
//!
//! Events are sent with an [`Emitter`] which can be cloned and moved to other tasks.
use std::sync::Arc;

use bytes::Bytes;
use engineio_client_core::{Event, Message, OpenPacket, Packet, PacketKind};
use futures_util::{StreamExt, stream::SplitStream};
use serde_json::Value;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
    time::Instant,
};
use tokio_tungstenite::{WebSocketStream, tungstenite::Message as WsMessage};

use crate::{
    config::ClientConfig, errors::TransportError, handler::Handlers, heartbeat::Heartbeat,
    transport::ws::Writer,
};

/// Why a [`Session`] ended without error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The server sent a close packet
    Close,
    /// The server sent a noop packet
    Noop,
    /// The server disconnected the client from the socket.io namespace
    Disconnect,
    /// The websocket connection was closed by the server
    TransportClose,
}

/// A negotiated and upgraded engine.io session.
pub struct Session<S> {
    open: OpenPacket,
    reader: SplitStream<WebSocketStream<S>>,
    writer: Arc<Writer<S>>,
    handlers: Handlers,
    config: ClientConfig,
    last_pong: Option<Instant>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub(crate) fn new(
        ws: WebSocketStream<S>,
        open: OpenPacket,
        handlers: Handlers,
        config: ClientConfig,
    ) -> Self {
        let (tx, rx) = ws.split();
        Self {
            open,
            reader: rx,
            writer: Arc::new(Writer::new(tx)),
            handlers,
            config,
            last_pong: None,
        }
    }

    /// The session id.
    pub fn sid(&self) -> &str {
        &self.open.sid
    }

    /// The [`OpenPacket`] negotiated during the handshake.
    pub fn open_packet(&self) -> &OpenPacket {
        &self.open
    }

    /// The handler registry of this session. Handlers can be added while the session runs.
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Get an [`Emitter`] to send events on this session.
    pub fn emitter(&self) -> Emitter<S> {
        Emitter {
            writer: self.writer.clone(),
        }
    }

    /// Read the connection and dispatch events until the session ends.
    ///
    /// Returns the [`CloseReason`] if the session ended gracefully,
    /// or the [`TransportError`] that ended it.
    pub async fn run(mut self) -> Result<CloseReason, TransportError> {
        let (err_tx, err_rx) = mpsc::channel(1);
        let heartbeat = Heartbeat::spawn(
            self.writer.clone(),
            self.open.ping_interval(),
            self.config.heartbeat,
            err_tx,
        );

        let res = self.read_loop(err_rx).await;

        #[cfg(feature = "tracing")]
        tracing::debug!(sid = %self.open.sid, ?res, "session ended");

        heartbeat.stop().await;
        self.writer.close().await;
        res
    }

    async fn read_loop(
        &mut self,
        mut heartbeat_err: mpsc::Receiver<TransportError>,
    ) -> Result<CloseReason, TransportError> {
        if self.config.connect_namespace {
            self.writer.send(Message::connect().into()).await?;
        }

        loop {
            let msg = tokio::select! {
                msg = self.reader.next() => msg,
                Some(err) = heartbeat_err.recv() => return Err(err),
            };
            let data: Bytes = match msg {
                Some(Ok(WsMessage::Text(text))) => text.into(),
                Some(Ok(WsMessage::Close(_))) | None => return Ok(CloseReason::TransportClose),
                Some(Ok(WsMessage::Binary(_data))) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(sid = %self.open.sid, len = _data.len(), "ignoring binary frame");
                    continue;
                }
                // websocket ping / pong frames are answered by tungstenite
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::ReadFailed(Box::new(e))),
            };

            let packet = match Packet::decode(data) {
                Ok(packet) => packet,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(sid = %self.open.sid, "skipping malformed frame: {_e}");
                    continue;
                }
            };

            if let Some(reason) = self.on_packet(packet).await? {
                return Ok(reason);
            }
        }
    }

    async fn on_packet(&mut self, packet: Packet) -> Result<Option<CloseReason>, TransportError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(sid = %self.open.sid, ?packet, "received packet");

        match packet.kind {
            PacketKind::Ping => {
                self.writer
                    .send(Packet::new(PacketKind::Pong, packet.payload))
                    .await?;
            }
            PacketKind::Pong => self.last_pong = Some(Instant::now()),
            PacketKind::Close => return Ok(Some(CloseReason::Close)),
            PacketKind::Noop => return Ok(Some(CloseReason::Noop)),
            PacketKind::Message => return Ok(self.on_message(packet.payload)),
            PacketKind::Open | PacketKind::Upgrade => {
                #[cfg(feature = "tracing")]
                tracing::debug!(sid = %self.open.sid, kind = ?packet.kind, "unexpected packet, ignoring");
            }
        }
        Ok(None)
    }

    fn on_message(&self, payload: Bytes) -> Option<CloseReason> {
        match Message::decode(payload) {
            Ok(Message::Event(Event { name, data })) => {
                if !self.handlers.dispatch(&name, data) {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(sid = %self.open.sid, event = %name, "no handler bound");
                }
            }
            Ok(Message::Disconnect) => return Some(CloseReason::Disconnect),
            Ok(Message::Connect(_data)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(sid = %self.open.sid, ?_data, "namespace connected");
            }
            Ok(Message::ConnectError(_data)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(sid = %self.open.sid, ?_data, "namespace connection refused");
            }
            Ok(Message::Text(_text)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(sid = %self.open.sid, ?_text, "ignoring text message");
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(sid = %self.open.sid, "skipping invalid message: {_e}");
            }
        }
        None
    }

    /// The instant of the last pong packet received, if any.
    pub fn last_pong(&self) -> Option<Instant> {
        self.last_pong
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("sid", &self.open.sid)
            .field("open", &self.open)
            .field("handlers", &self.handlers)
            .field("config", &self.config)
            .field("last_pong", &self.last_pong)
            .finish()
    }
}

/// Sends packets on a [`Session`] connection.
///
/// Writes are serialized with the session's own writes. Once the session has ended
/// every call fails with [`TransportError::WriteFailed`].
pub struct Emitter<S> {
    writer: Arc<Writer<S>>,
}

impl<S> Clone for Emitter<S> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
        }
    }
}

impl<S> Emitter<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Emit an event with a single argument, encoded as `42["event",data]`.
    pub async fn emit(&self, event: impl Into<String>, data: Value) -> Result<(), TransportError> {
        self.writer.send(Message::event(event, data).into()).await
    }

    /// Ask the server to close the session by sending a close packet.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.writer.send(Packet::close()).await
    }
}

impl<S> std::fmt::Debug for Emitter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter").finish_non_exhaustive()
    }
}
