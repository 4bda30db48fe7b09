//! # Transport Layer
//!
//! Socket ownership and connection lifecycle.
//!
//! The transport owns the raw stream exclusively and presents whole frames
//! to the layers above it. Connection state is observable through a watch
//! channel that fires on transitions only.

pub mod tcp;

pub use tcp::{ConnectionState, TcpConnection};
