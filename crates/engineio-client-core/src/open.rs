use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::TransportType;

/// The polling payload record separator.
const RECORD_SEPARATOR: u8 = 0x1e;

/// An OpenPacket is sent by the server to initiate a session.
///
/// It describes the negotiated session: its id, the heartbeat timings and the
/// transports the session can be upgraded to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenPacket {
    /// The session ID.
    pub sid: String,
    /// The list of available transport upgrades.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// The ping interval, used in the heartbeat mechanism (in milliseconds).
    pub ping_interval: u64,
    /// The ping timeout, used in the heartbeat mechanism (in milliseconds).
    pub ping_timeout: u64,
    /// The maximum number of bytes per chunk, if the server advertises it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// An error that occurs when parsing the handshake response.
#[derive(Debug)]
pub enum HandshakeParseError {
    /// The server answered with a non successful http status.
    Status(u16),
    /// The open packet is not valid json or misses a required field.
    Json(serde_json::Error),
    /// The open packet is well formed but violates the protocol.
    Invalid(&'static str),
}
impl fmt::Display for HandshakeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeParseError::Status(status) => write!(f, "unexpected http status {status}"),
            HandshakeParseError::Json(e) => write!(f, "invalid open packet: {e}"),
            HandshakeParseError::Invalid(reason) => write!(f, "invalid open packet: {reason}"),
        }
    }
}
impl std::error::Error for HandshakeParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandshakeParseError::Json(e) => Some(e),
            _ => None,
        }
    }
}
impl From<serde_json::Error> for HandshakeParseError {
    fn from(err: serde_json::Error) -> Self {
        HandshakeParseError::Json(err)
    }
}

impl OpenPacket {
    /// Parse the body of a polling handshake response.
    ///
    /// Servers vary in how strictly they frame the open packet, so all of these are accepted:
    /// * `0{"sid":...}`
    /// * `97:0{"sid":...}` (length prefixed)
    /// * `{"sid":...}` (bare json)
    ///
    /// If the body holds several packets separated by the record separator, only the first one is read.
    pub fn from_handshake_body(body: &[u8]) -> Result<Self, HandshakeParseError> {
        let record = body
            .split(|b| *b == RECORD_SEPARATOR)
            .next()
            .unwrap_or_default();
        let record = strip_length_prefix(record);
        let json = match record.first() {
            Some(b'0') => &record[1..],
            _ => record,
        };
        let open: OpenPacket = serde_json::from_slice(json)?;
        open.validate()?;
        Ok(open)
    }

    fn validate(&self) -> Result<(), HandshakeParseError> {
        if self.sid.is_empty() {
            Err(HandshakeParseError::Invalid("empty session id"))
        } else if self.ping_interval == 0 {
            Err(HandshakeParseError::Invalid("ping interval must be positive"))
        } else if self.ping_timeout == 0 {
            Err(HandshakeParseError::Invalid("ping timeout must be positive"))
        } else {
            Ok(())
        }
    }

    /// The interval at which heartbeat packets are sent.
    #[inline]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval)
    }

    /// The amount of time a heartbeat response may take.
    #[inline]
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout)
    }

    /// Check if the session can be upgraded to the given transport.
    pub fn supports(&self, transport: TransportType) -> bool {
        self.upgrades.iter().any(|u| u == transport.as_query())
    }
}

/// Strip a `<len>:` prefix if there is one.
fn strip_length_prefix(record: &[u8]) -> &[u8] {
    let digits = record.iter().take_while(|b| b.is_ascii_digit()).count();
    match record.get(digits) {
        Some(b':') if digits > 0 => &record[digits + 1..],
        _ => record,
    }
}
