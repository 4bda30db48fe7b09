//! # Core Protocol Components
//!
//! Low-level field encoding, packet framing, and the wire codec.
//!
//! This module provides the foundation for the protocol: the tagged binary
//! value codec, the generic packet field framework, and the frame codec that
//! turns a byte stream into discrete opcode-tagged messages.
//!
//! ## Components
//! - **Binary**: tagged little-endian value encode/decode with size ceilings
//! - **Packet**: ordered named field sets with generic pack/unpack
//! - **Codec**: Tokio codec for framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Magic(2)] [Length(4)] [Opcode(1)] [Payload(N)]
//! ```
//!
//! ## Security
//! - Maximum frame length: 64MB (prevents memory exhaustion)
//! - Magic bytes prevent accidental misinterpretation
//! - String/list ceilings checked before payload decoding

pub mod binary;
pub mod codec;
pub mod packet;

pub use binary::{Bin, BinaryReader, BinaryWriter, Value};
pub use codec::{Frame, FrameCodec};
pub use packet::{Field, Packet};
