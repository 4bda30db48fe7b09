//! # Client Service Loop
//!
//! Drives a connection for the life of the process: connect, receive,
//! dispatch, and reconnect with a fixed backoff whenever anything fails.
//!
//! One long-lived task runs [`Client::run`]; outbound [`Client::send`] calls
//! interleave with it on the same connection. Two independent senders on one
//! client are not serialised against each other and need single-writer
//! discipline at the call site.

use crate::config::ClientConfig;
use crate::core::codec::Frame;
use crate::core::packet::Packet;
use crate::error::Result;
use crate::protocol::registry::Registry;
use crate::transport::tcp::TcpConnection;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A reconnecting protocol client.
///
/// Owns the connection and the opcode registry; received frames are resolved
/// through the registry and dispatched into each variant's `parse` hook.
pub struct Client {
    conn: TcpConnection,
    registry: Registry,
    backoff: Duration,
}

impl Client {
    /// Client for the given address with default timing and an empty registry.
    pub fn new(address: impl Into<String>) -> Self {
        Self::from_config(&ClientConfig::new(address.into()))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            conn: TcpConnection::from_config(config),
            registry: Registry::new(),
            backoff: config.reconnect_backoff,
        }
    }

    /// The registry consulted for received opcodes. Register every variant
    /// before starting [`Client::run`].
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The underlying connection, e.g. for state subscriptions.
    pub fn connection(&self) -> &TcpConnection {
        &self.conn
    }

    /// Service loop: keep the connection alive and dispatch received frames.
    ///
    /// While disconnected, attempts to connect and sleeps the fixed backoff
    /// after each failure. While connected, receives one message at a time;
    /// any receive failure tears the connection down and re-enters the
    /// backoff cycle. Runs until the owning task is dropped.
    pub async fn run(&self) {
        loop {
            if !self.conn.is_connected() {
                if let Err(e) = self.conn.connect().await {
                    debug!(error = %e, "connect attempt failed");
                    sleep(self.backoff).await;
                    continue;
                }
            }

            if let Err(e) = self.recv_one().await {
                warn!(error = %e, "receive failed, dropping connection");
                self.conn.disconnect().await;
                sleep(self.backoff).await;
            }
        }
    }

    /// Receive and dispatch one message.
    ///
    /// Unknown opcodes are consumed silently: the frame was well formed, the
    /// peer is ahead of us, and the stream remains usable. Everything else
    /// that goes wrong here is a connection-level failure.
    async fn recv_one(&self) -> Result<()> {
        let frame = self.conn.recv().await?;

        match self.registry.create(frame.opcode)? {
            Some(mut packet) => {
                packet.unpack(&frame.payload)?;
                packet.parse();
                debug!(
                    opcode = frame.opcode,
                    bytes = frame.payload.len(),
                    "packet dispatched"
                );
            }
            None => debug!(opcode = frame.opcode, "unknown opcode, frame discarded"),
        }
        Ok(())
    }

    /// Pack and send one packet as a single frame.
    ///
    /// Reconnects first if the connection is down; if that fails the send
    /// fails without any bytes written.
    pub async fn send(&self, packet: &dyn Packet) -> Result<()> {
        let payload = packet.pack()?;

        if !self.conn.is_connected() {
            self.conn.connect().await?;
        }

        self.conn.send(Frame::new(packet.opcode(), payload)).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("connection", &self.conn)
            .field("registry", &self.registry)
            .field("backoff", &self.backoff)
            .finish()
    }
}
