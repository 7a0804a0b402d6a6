#![cfg_attr(docsrs, feature(doc_cfg))]
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
    clippy::if_let_mutex,
    clippy::await_holding_lock,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::fn_params_excessive_bools,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    rust_2018_idioms,
    rust_2024_compatibility,
    future_incompatible,
    nonstandard_style,
    missing_docs
)]
//! Engine.IO client with a thin Socket.IO event layer.
//!
//! A session is established in two steps:
//! 1. a polling handshake negotiates the session id and the heartbeat timings,
//! 2. the session is upgraded to a websocket connection kept for its whole lifetime.
//!
//! The [`Session`] then reads the connection, answers pings, emits heartbeats and
//! dispatches socket.io events to the handlers bound with [`ClientBuilder::on`].
//!
//! #### Example :
//! ```no_run
//! # use engineio_client::ClientBuilder;
//! # use serde_json::{Value, json};
//! # async fn doc() -> Result<(), Box<dyn std::error::Error>> {
//! let session = ClientBuilder::new("http://localhost:3000")
//!     .on("chat", |data: Value| println!("chat: {data}"))
//!     .connect()
//!     .await?;
//!
//! let emitter = session.emitter();
//! let handle = tokio::spawn(session.run());
//!
//! emitter.emit("chat", json!("hello")).await?;
//! let reason = handle.await??;
//! println!("session ended: {reason:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags :
//! * `tracing`: emit debug logs with the [`tracing`](https://docs.rs/tracing) crate.

pub use client::{ClientBuilder, ClientSession};
pub use config::{ClientConfig, HeartbeatMode, UpgradeMode};
pub use engineio_client_core::{Event, Message, OpenPacket, Packet, PacketKind};
pub use errors::{
    BoxError, ConfirmationError, ConnectError, DecodeError, HandshakeError, TransportError,
    UpgradeError,
};
pub use session::{CloseReason, Emitter, Session};

pub mod config;
pub mod handler;
pub mod session;
pub mod transport;

mod client;
mod errors;
mod heartbeat;
