//! # Protocol Layer
//!
//! Opcode-based variant resolution and the built-in message schemas.
//!
//! The [`registry`] maps each wire opcode to a packet constructor; the
//! service loop consults it to materialise a typed instance for every
//! received frame. [`message`] holds the built-in calculator variants, which
//! also serve as the reference for declaring new ones.

pub mod message;
pub mod registry;

pub use message::{CalcError, CalcRequest, CalcResponse, Opcode};
pub use registry::Registry;
