//! # TCP Connection Manager
//!
//! Exclusive owner of the client socket.
//!
//! The connection is a single logical stream endpoint: an address, an
//! optional live socket, and a connected flag. Nothing outside this module
//! touches the socket handle; the frame codec rides on top of the split
//! stream halves, and the socket is fully torn down and rebuilt (never
//! reused) on every reconnect.
//!
//! State notifications are delivered over a `watch` channel and fire only on
//! actual transitions, not on repeated identical states. Disconnect fires
//! the transition before attempting the close so a failing close cannot hide
//! that the connection is down.

use crate::config::ClientConfig;
use crate::core::codec::{Frame, FrameCodec};
use crate::error::{ProtocolError, Result};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument};

/// Logical connection state, as observed through [`TcpConnection::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// A single client connection with exclusive socket ownership.
pub struct TcpConnection {
    address: String,
    connect_timeout: Duration,
    reader: Mutex<Option<FramedRead<OwnedReadHalf, FrameCodec>>>,
    writer: Mutex<Option<FramedWrite<OwnedWriteHalf, FrameCodec>>>,
    connected: AtomicBool,
    state_tx: watch::Sender<ConnectionState>,
}

impl TcpConnection {
    pub fn new(address: impl Into<String>) -> Self {
        Self::from_config(&ClientConfig::new(address.into()))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            address: config.address.clone(),
            connect_timeout: config.connect_timeout,
            reader: Mutex::new(None),
            writer: Mutex::new(None),
            connected: AtomicBool::new(false),
            state_tx,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Observe connection-state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Record a state change; notifies observers only on a transition.
    fn set_connected(&self, up: bool) {
        if self.connected.swap(up, Ordering::SeqCst) != up {
            let state = if up {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            };
            info!(address = %self.address, ?state, "connection state changed");
            self.state_tx.send_replace(state);
        }
    }

    /// Open a fresh socket to the configured address.
    ///
    /// An existing connection is torn down first; the socket is never reused
    /// across connects.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            self.disconnect().await;
        }

        let attempt = TcpStream::connect(&self.address);
        let stream = match tokio::time::timeout(self.connect_timeout, attempt).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                self.set_connected(false);
                return Err(e.into());
            }
            Err(_) => {
                self.set_connected(false);
                return Err(ProtocolError::ConnectTimeout);
            }
        };

        let (read_half, write_half) = stream.into_split();
        *self.reader.lock().await = Some(FramedRead::new(read_half, FrameCodec));
        *self.writer.lock().await = Some(FramedWrite::new(write_half, FrameCodec));
        self.set_connected(true);
        Ok(())
    }

    /// Best-effort close. The disconnected transition fires before the close
    /// attempt so observers learn the connection is down even if the close
    /// itself fails.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn disconnect(&self) {
        self.set_connected(false);

        let mut writer = self.writer.lock().await;
        if let Some(mut framed) = writer.take() {
            if let Err(e) = framed.close().await {
                debug!(error = %e, "error while closing connection");
            }
        }
        *self.reader.lock().await = None;
    }

    /// Receive one whole frame.
    ///
    /// Partial reads are assembled internally; a stream that ends or errors
    /// mid-frame fails the whole receive, never yielding a partial frame.
    pub async fn recv(&self) -> Result<Frame> {
        let mut guard = self.reader.lock().await;
        let framed = guard.as_mut().ok_or(ProtocolError::NotConnected)?;
        match framed.next().await {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(e)) => Err(e),
            None => Err(ProtocolError::ConnectionClosed),
        }
    }

    /// Write one frame and flush it to the transport before returning.
    pub async fn send(&self, frame: Frame) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let framed = guard.as_mut().ok_or(ProtocolError::NotConnected)?;
        framed.send(frame).await
    }
}

impl std::fmt::Debug for TcpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnection")
            .field("address", &self.address)
            .field("connected", &self.is_connected())
            .finish()
    }
}
