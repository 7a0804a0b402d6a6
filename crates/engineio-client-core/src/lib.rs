#![warn(
    clippy::all,
    clippy::todo,
    clippy::empty_enum,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::inefficient_to_string,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::unnested_or_patterns,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    missing_docs
)]
//! Engine.IO client core types: the transport packet codec, the socket.io message codec
//! and the open packet negotiated during the handshake.
//!
//! Nothing in this crate does any I/O.

pub use message::{Event, Message};
pub use open::{HandshakeParseError, OpenPacket};
pub use packet::{DecodeError, EventPacketError, Packet, PacketKind};
pub use protocol::{ProtocolVersion, TransportType};

pub mod message;
mod open;
mod packet;
mod protocol;
