use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// The fixed set of engine.io packet types.
///
/// Each packet on the wire starts with the ascii digit of its type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    /// Open packet, sent by the server to initiate a session
    Open = 0,
    /// Close packet used to close a session
    Close = 1,
    /// Ping packet used to check if the connection is still alive
    Ping = 2,
    /// Pong packet used to respond to a Ping packet
    Pong = 3,
    /// Message packet carrying a socket.io packet or opaque text
    Message = 4,
    /// Upgrade packet, used to confirm a transport upgrade
    Upgrade = 5,
    /// Noop packet
    Noop = 6,
}

impl PacketKind {
    /// The ascii marker of this packet type.
    #[inline]
    pub const fn marker(self) -> u8 {
        b'0' + self as u8
    }

    /// Get the packet type from its ascii marker.
    pub const fn from_marker(marker: u8) -> Option<Self> {
        let kind = match marker {
            b'0' => PacketKind::Open,
            b'1' => PacketKind::Close,
            b'2' => PacketKind::Ping,
            b'3' => PacketKind::Pong,
            b'4' => PacketKind::Message,
            b'5' => PacketKind::Upgrade,
            b'6' => PacketKind::Noop,
            _ => return None,
        };
        Some(kind)
    }
}

/// An error that occurs when decoding a packet.
#[derive(Debug)]
pub enum DecodeError {
    /// The packet is empty (`None`) or its type marker is not a known packet type.
    MalformedPacket(Option<char>),
    /// The socket.io event packet could not be decoded.
    InvalidEventPacket(EventPacketError),
}

/// Why a socket.io event packet is invalid.
#[derive(Debug)]
pub enum EventPacketError {
    /// The payload is not valid json.
    Json(serde_json::Error),
    /// The payload is not a json array.
    NotAnArray,
    /// The first element of the array is missing or is not a string.
    InvalidEventName,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedPacket(None) => write!(f, "malformed packet: empty frame"),
            DecodeError::MalformedPacket(Some(c)) => {
                write!(f, "malformed packet: unknown packet type {c:?}")
            }
            DecodeError::InvalidEventPacket(e) => write!(f, "invalid event packet: {e}"),
        }
    }
}
impl fmt::Display for EventPacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPacketError::Json(e) => write!(f, "{e}"),
            EventPacketError::NotAnArray => write!(f, "expected a json array"),
            EventPacketError::InvalidEventName => write!(f, "missing or non string event name"),
        }
    }
}
impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::InvalidEventPacket(EventPacketError::Json(e)) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for EventPacketError {}

impl From<EventPacketError> for DecodeError {
    fn from(err: EventPacketError) -> Self {
        DecodeError::InvalidEventPacket(err)
    }
}
impl From<serde_json::Error> for EventPacketError {
    fn from(err: serde_json::Error) -> Self {
        EventPacketError::Json(err)
    }
}

/// A transport level engine.io packet: a type and a raw payload.
///
/// The payload is kept verbatim, so `2probe` is a [`PacketKind::Ping`] with a `probe` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// The packet type
    pub kind: PacketKind,
    /// The bytes following the type marker, possibly empty
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet from its type and payload.
    pub fn new(kind: PacketKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// An empty packet of the given type.
    pub fn empty(kind: PacketKind) -> Self {
        Self::new(kind, Bytes::new())
    }

    /// A ping packet without payload.
    pub fn ping() -> Self {
        Self::empty(PacketKind::Ping)
    }

    /// A pong packet without payload.
    pub fn pong() -> Self {
        Self::empty(PacketKind::Pong)
    }

    /// A close packet.
    pub fn close() -> Self {
        Self::empty(PacketKind::Close)
    }

    /// A message packet carrying the given payload.
    pub fn message(payload: impl Into<Bytes>) -> Self {
        Self::new(PacketKind::Message, payload)
    }

    /// Decode a raw frame. The first byte selects the packet type,
    /// the remaining bytes are the payload.
    pub fn decode(raw: impl Into<Bytes>) -> Result<Self, DecodeError> {
        let mut raw: Bytes = raw.into();
        let marker = *raw.first().ok_or(DecodeError::MalformedPacket(None))?;
        let kind = PacketKind::from_marker(marker)
            .ok_or(DecodeError::MalformedPacket(Some(marker as char)))?;
        let payload = raw.split_off(1);
        Ok(Self { kind, payload })
    }

    /// Encode the packet by prepending its type marker to the payload.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + self.payload.len());
        buf.put_u8(self.kind.marker());
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

impl From<Packet> for Bytes {
    fn from(packet: Packet) -> Self {
        packet.encode()
    }
}

impl TryFrom<Bytes> for Packet {
    type Error = DecodeError;
    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        Packet::decode(value)
    }
}
