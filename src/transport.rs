//! 传输层模块：基于长度前缀帧的流式套接字传输与连接管理。
//!
//! # Transport Module
//!
//! Turns a raw stream socket into a sequence of discrete frames and manages the
//! socket lifecycle.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`FrameCodec`] | 4-byte big-endian length prefix + payload |
//! | [`Connection`] | One framed socket with optional I/O timeout |
//! | [`TcpConnector`] | Opens TCP connections to an [`Endpoint`] |
//! | [`FrameChannel`] / [`Connector`] | Seams the client is generic over |
//!
//! Nothing in this module retries. Retry and reconnect policy belongs to
//! [`crate::client`].

pub mod frame;
pub mod tcp;

pub use frame::{FrameCodec, DEFAULT_MAX_FRAME_LENGTH};
pub use tcp::{Connection, TcpConnector};

use crate::types::Endpoint;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint was unreachable, refused the connection, or the connect timed out.
    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream before a complete frame arrived.
    /// `buffered` counts the bytes of the incomplete frame that were discarded.
    #[error("connection closed by peer ({buffered} bytes of an incomplete frame buffered)")]
    ConnectionClosed { buffered: usize },

    #[error("not connected")]
    NotConnected,

    /// Rejected locally before any byte reached the socket.
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl TransportError {
    /// Whether a fresh connection could make the same operation succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::FrameTooLarge { .. })
    }
}

/// A live, framed connection to the server.
#[async_trait]
pub trait FrameChannel: Send {
    /// Send one frame and flush it.
    async fn write_frame(&mut self, payload: Bytes) -> Result<(), TransportError>;

    /// Wait for exactly one complete frame.
    async fn read_frame(&mut self) -> Result<Bytes, TransportError>;

    /// Release the socket. Idempotent and never fails.
    async fn close(&mut self);
}

/// Opens [`FrameChannel`]s. One call, one attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    type Channel: FrameChannel;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Channel, TransportError>;
}
