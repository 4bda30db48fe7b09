//! # Configuration Management
//!
//! Centralized configuration and wire constants for the packet protocol.
//!
//! This module provides the fixed wire-format limits enforced by the codec
//! plus a structured client configuration covering the connection address,
//! reconnect backoff, and connect timeout.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides
//!
//! ## Security Considerations
//! - The frame length ceiling (64 MB) bounds allocation from a hostile peer
//! - String and list ceilings reject absurd counts before any payload decode

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Magic value identifying protocol frames, little-endian on the wire.
pub const FRAME_MAGIC: u16 = 0x6529;

/// Max allowed frame length (opcode byte + field payload), 64 MB.
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Max decoded string field length in bytes.
pub const MAX_STRING_BYTES: usize = 65536;

/// Max decoded list field item count.
pub const MAX_LIST_ITEMS: usize = 4096;

/// Client configuration covering connection and retry behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Remote address to connect to, e.g. "127.0.0.1:9000"
    #[serde(default = "default_address")]
    pub address: String,

    /// Fixed delay between reconnect attempts
    #[serde(default = "default_reconnect_backoff")]
    pub reconnect_backoff: Duration,

    /// Upper bound on a single connect attempt
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

fn default_address() -> String {
    "127.0.0.1:9000".to_string()
}

fn default_reconnect_backoff() -> Duration {
    Duration::from_secs(1)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            reconnect_backoff: default_reconnect_backoff(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given address with default timing
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(addr) = std::env::var("PACKETWIRE_ADDRESS") {
            config.address = addr;
        }

        if let Ok(backoff) = std::env::var("PACKETWIRE_RECONNECT_BACKOFF_MS") {
            if let Ok(val) = backoff.parse::<u64>() {
                config.reconnect_backoff = Duration::from_millis(val);
            }
        }

        if let Ok(timeout) = std::env::var("PACKETWIRE_CONNECT_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.connect_timeout = Duration::from_millis(val);
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("address must not be empty".to_string());
        } else if !self.address.contains(':') {
            errors.push(format!(
                "address {:?} is missing a port (expected host:port)",
                self.address
            ));
        }

        if self.reconnect_backoff.is_zero() {
            errors.push("reconnect_backoff of zero would spin on a dead peer".to_string());
        }

        if self.connect_timeout.is_zero() {
            errors.push("connect_timeout of zero would fail every attempt".to_string());
        }

        errors
    }
}
