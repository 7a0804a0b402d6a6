use engineio_client_core::{HandshakeParseError, PacketKind};
use tokio_tungstenite::tungstenite;

pub use engineio_client_core::DecodeError;

/// A boxed error coming from the pluggable http service.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The polling handshake failed, no session could be negotiated.
#[derive(thiserror::Error, Debug)]
pub enum HandshakeError {
    /// The server could not be reached or the response body could not be read.
    #[error("server unreachable: {0}")]
    Unreachable(#[source] BoxError),
    /// The server response does not hold a valid open packet.
    #[error("malformed handshake response: {0}")]
    MalformedResponse(#[from] HandshakeParseError),
}

/// The session could not be upgraded to a websocket connection.
#[derive(thiserror::Error, Debug)]
pub enum UpgradeError {
    /// The websocket connection could not be opened.
    #[error("websocket connection failed: {0}")]
    ConnectFailed(#[source] Box<tungstenite::Error>),
    /// The server did not confirm the upgrade.
    #[error("upgrade confirmation failed: {0}")]
    ConfirmationFailed(ConfirmationError),
}

/// Why an upgrade was not confirmed by the server.
#[derive(thiserror::Error, Debug)]
pub enum ConfirmationError {
    /// Reading the confirmation frame failed.
    #[error("read error: {0}")]
    Read(#[source] Box<tungstenite::Error>),
    /// Writing a probe frame failed.
    #[error("write error: {0}")]
    Write(#[source] Box<tungstenite::Error>),
    /// The connection was closed before the confirmation frame.
    #[error("connection closed")]
    Closed,
    /// The confirmation frame could not be decoded.
    #[error("{0}")]
    Decode(#[from] DecodeError),
    /// The confirmation frame is not of the expected type.
    #[error("unexpected {0:?} packet")]
    UnexpectedPacket(PacketKind),
    /// The confirmation frame is not a text frame.
    #[error("unexpected non text frame")]
    UnexpectedFrame,
}

impl From<ConfirmationError> for UpgradeError {
    fn from(err: ConfirmationError) -> Self {
        UpgradeError::ConfirmationFailed(err)
    }
}

/// A fatal error on a running session.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Reading from the connection failed.
    #[error("read failed: {0}")]
    ReadFailed(#[source] Box<tungstenite::Error>),
    /// Writing to the connection failed.
    #[error("write failed: {0}")]
    WriteFailed(#[source] Box<tungstenite::Error>),
}

/// Error returned by [`ClientBuilder::connect`](crate::ClientBuilder::connect).
#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    /// The server url could not be parsed.
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The handshake failed.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    /// The websocket upgrade failed.
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
}
