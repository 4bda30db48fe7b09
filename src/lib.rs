//! # packetwire
//!
//! Self-describing binary packet codec with a framed, auto-reconnecting TCP
//! transport.
//!
//! Two processes exchange strongly-typed packets without hand-written
//! per-message parsing: each packet variant declares an ordered set of typed
//! fields, the codec serialises and deserialises them generically, and a
//! registry maps wire opcodes to variants at decode time. The transport
//! frames messages over a raw byte stream and keeps the connection alive
//! across drops with a fixed backoff.
//!
//! ## Layers
//! - [`core`]: tagged value codec, packet field framework, frame codec
//! - [`protocol`]: opcode registry and the built-in message schemas
//! - [`transport`]: exclusive socket ownership and connection lifecycle
//! - [`service`]: the reconnecting client loop
//!
//! ## Example
//! ```no_run
//! use packetwire::protocol::message::{register_builtin, CalcRequest};
//! use packetwire::service::Client;
//!
//! # async fn demo() -> packetwire::error::Result<()> {
//! let client = Client::new("127.0.0.1:9000");
//! register_builtin(client.registry())?;
//!
//! client.send(&CalcRequest::new(["7", "+", "3"])).await?;
//! client.run().await; // drives receive + reconnect forever
//! # Ok(())
//! # }
//! ```
//!
//! ## Wire Format
//! ```text
//! [Magic(2) = 0x6529] [Length(4)] [Opcode(1)] [Payload(N)]
//! ```
//! All integers little-endian; `Length` counts the opcode byte plus payload.
//!
//! ## Security
//! - Frame length capped at 64MB, strings at 64KB, lists at 4096 items
//! - Every decode is bounds-checked; truncated input is a distinct error
//! - Unknown opcodes are discarded silently for forward compatibility

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;

pub use crate::core::{Bin, Field, Frame, FrameCodec, Packet, Value};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::Registry;
pub use crate::service::Client;
pub use crate::transport::{ConnectionState, TcpConnection};
