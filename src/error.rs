//! # Error Types
//!
//! Comprehensive error handling for the packet protocol.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O errors to wire-format violations.
//!
//! ## Error Categories
//! - **I/O Errors**: Socket and connection failures
//! - **Decode Errors**: Truncated input, oversized fields, invalid UTF-8
//! - **Frame Errors**: Bad magic, implausible lengths
//! - **Registry Errors**: Duplicate opcode registrations
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Propagation Policy
//! Any decode or framing error encountered while receiving escalates to a
//! connection-level failure: the transport cannot recover mid-stream framing
//! after a corrupt frame, so the service loop tears the connection down and
//! re-enters its reconnect cycle. Send-path failures are returned to the
//! caller synchronously.

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
/// Static strings are borrowed, avoiding heap allocations for common error cases.
pub mod constants {
    /// Registry-related error messages
    pub const ERR_REGISTRY_WRITE_LOCK: &str = "Failed to acquire write lock on packet registry";
    pub const ERR_REGISTRY_READ_LOCK: &str = "Failed to acquire read lock on packet registry";
}

// ProtocolError is the primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    #[error("string field too large: {0} bytes")]
    OversizedString(usize),

    #[error("list field too large: {0} items")]
    OversizedList(usize),

    #[error("frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("invalid frame magic: {0:#06x}")]
    BadMagic(u16),

    #[error("frame carries no opcode byte")]
    EmptyFrame,

    #[error("invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("field {field:?} holds a value of the wrong type")]
    FieldTypeMismatch { field: &'static str },

    #[error("list items must be scalar or string typed")]
    NestedList,

    #[error("opcode {0} is already registered")]
    DuplicateOpcode(u8),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("not connected")]
    NotConnected,

    #[error("connect timed out")]
    ConnectTimeout,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("custom error: {0}")]
    Custom(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
