//! Socket.io packets carried inside engine.io [`Message`](crate::PacketKind::Message) packets.
//!
//! Only the default namespace is handled. The first byte of a message payload is the
//! socket.io packet type:
//!
//! | Type          | ID  | Handling                                        |
//! |---------------|-----|-------------------------------------------------|
//! | CONNECT       | 0   | [`Message::Connect`] with an optional json body |
//! | DISCONNECT    | 1   | [`Message::Disconnect`]                         |
//! | EVENT         | 2   | [`Message::Event`], a `["name", data]` array    |
//! | CONNECT_ERROR | 4   | [`Message::ConnectError`]                       |
//!
//! Any other payload is kept as opaque [`Message::Text`].

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::packet::{DecodeError, EventPacketError, Packet};

const CONNECT: u8 = b'0';
const DISCONNECT: u8 = b'1';
const EVENT: u8 = b'2';
const CONNECT_ERROR: u8 = b'4';

/// An application event: a name and a single json argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The event name
    pub name: String,
    /// The event argument, [`Value::Null`] when the server sent none
    pub data: Value,
}

impl Event {
    /// Create a new event.
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Decode a `["name", data]` json array.
    ///
    /// The first element must be a string. A missing second element decodes to [`Value::Null`],
    /// any element after the second one is ignored.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(payload).map_err(EventPacketError::from)?;
        let Value::Array(items) = value else {
            return Err(EventPacketError::NotAnArray.into());
        };
        let mut items = items.into_iter();
        let name = match items.next() {
            Some(Value::String(name)) => name,
            _ => return Err(EventPacketError::InvalidEventName.into()),
        };
        let data = items.next().unwrap_or(Value::Null);
        Ok(Self { name, data })
    }

    /// Encode the event as a `["name", data]` json array.
    pub fn encode(&self) -> Bytes {
        // Serializing a `Value` never fails
        let array = serde_json::to_vec(&(&self.name, &self.data)).unwrap_or_default();
        array.into()
    }
}

/// A socket.io packet of the default namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The server accepted the namespace connection
    Connect(Option<Value>),
    /// The server disconnected the client from the namespace
    Disconnect,
    /// The server refused the namespace connection
    ConnectError(Value),
    /// An application event
    Event(Event),
    /// Any other message payload, kept verbatim
    Text(Bytes),
}

impl Message {
    /// The namespace connect request sent by the client.
    pub fn connect() -> Self {
        Message::Connect(None)
    }

    /// An application event message.
    pub fn event(name: impl Into<String>, data: Value) -> Self {
        Message::Event(Event::new(name, data))
    }

    /// Decode the payload of an engine.io message packet.
    pub fn decode(payload: Bytes) -> Result<Self, DecodeError> {
        let Some(&ty) = payload.first() else {
            return Ok(Message::Text(payload));
        };
        let body = &payload[1..];
        let msg = match ty {
            CONNECT if body.is_empty() => Message::Connect(None),
            CONNECT => Message::Connect(Some(
                serde_json::from_slice(body).map_err(EventPacketError::from)?,
            )),
            DISCONNECT => Message::Disconnect,
            CONNECT_ERROR => Message::ConnectError(
                serde_json::from_slice(body).map_err(EventPacketError::from)?,
            ),
            EVENT => Message::Event(Event::decode(body)?),
            _ => Message::Text(payload),
        };
        Ok(msg)
    }

    /// Encode this socket.io packet as an engine.io message payload.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        match self {
            Message::Connect(data) => {
                buf.put_u8(CONNECT);
                if let Some(data) = data {
                    buf.put_slice(data.to_string().as_bytes());
                }
            }
            Message::Disconnect => buf.put_u8(DISCONNECT),
            Message::ConnectError(data) => {
                buf.put_u8(CONNECT_ERROR);
                buf.put_slice(data.to_string().as_bytes());
            }
            Message::Event(event) => {
                buf.put_u8(EVENT);
                buf.put_slice(&event.encode());
            }
            Message::Text(text) => buf.put_slice(text),
        }
        buf.freeze()
    }
}

impl From<Message> for Packet {
    fn from(msg: Message) -> Self {
        Packet::message(msg.encode())
    }
}
