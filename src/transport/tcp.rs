//! Connection management: opening and closing framed TCP connections.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use super::frame::{FrameCodec, DEFAULT_MAX_FRAME_LENGTH};
use super::{Connector, FrameChannel, TransportError};
use crate::config::ClientConfig;
use crate::types::Endpoint;

/// One framed stream plus its I/O deadline.
///
/// Generic over the stream so the framing can be driven over in-memory pipes
/// (`tokio::io::duplex`) as well as TCP sockets.
pub struct Connection<S = TcpStream> {
    framed: Framed<S, FrameCodec>,
    io_timeout: Option<Duration>,
    peer: String,
    closed: bool,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, codec: FrameCodec) -> Self {
        Self {
            framed: Framed::new(stream, codec),
            io_timeout: None,
            peer: "stream".to_string(),
            closed: false,
        }
    }

    /// Bound every frame read and write. `None` waits for the OS.
    pub fn with_io_timeout(mut self, io_timeout: Option<Duration>) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = peer.into();
        self
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn write_frame(&mut self, payload: Bytes) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::NotConnected);
        }
        let len = payload.len();
        with_timeout(self.io_timeout, "write_frame", self.framed.send(payload)).await??;
        debug!(peer = %self.peer, bytes = len, "frame written");
        Ok(())
    }

    pub async fn read_frame(&mut self) -> Result<Bytes, TransportError> {
        if self.closed {
            return Err(TransportError::NotConnected);
        }
        match with_timeout(self.io_timeout, "read_frame", self.framed.next()).await? {
            Some(frame) => {
                let frame = frame?;
                debug!(peer = %self.peer, bytes = frame.len(), "frame read");
                Ok(frame)
            }
            None => Err(TransportError::ConnectionClosed { buffered: 0 }),
        }
    }

    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.framed.get_mut().shutdown().await {
            debug!(peer = %self.peer, error = %e, "error while closing connection (ignored)");
        }
    }
}

#[async_trait]
impl<S> FrameChannel for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_frame(&mut self, payload: Bytes) -> Result<(), TransportError> {
        Connection::write_frame(self, payload).await
    }

    async fn read_frame(&mut self) -> Result<Bytes, TransportError> {
        Connection::read_frame(self).await
    }

    async fn close(&mut self) {
        Connection::close(self).await
    }
}

async fn with_timeout<F: Future>(
    limit: Option<Duration>,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, TransportError> {
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| TransportError::Timeout { operation, after }),
        None => Ok(fut.await),
    }
}

/// Opens TCP connections. Each `connect` call is exactly one attempt.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
    max_frame_length: usize,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self {
            connect_timeout: None,
            io_timeout: None,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            io_timeout: config.io_timeout(),
            max_frame_length: config.max_frame_length,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn with_max_frame_length(mut self, max: usize) -> Self {
        self.max_frame_length = max;
        self
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Channel = Connection<TcpStream>;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection<TcpStream>, TransportError> {
        let addr = (endpoint.host.as_str(), endpoint.port);
        let attempt = match self.connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, TcpStream::connect(addr)).await {
                Ok(res) => res,
                Err(_) => Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no answer within {:?}", limit),
                )),
            },
            None => TcpStream::connect(addr).await,
        };
        let stream = attempt.map_err(|source| TransportError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(endpoint = %endpoint, error = %e, "could not set TCP_NODELAY");
        }
        info!(endpoint = %endpoint, "connected to VQA server");

        Ok(
            Connection::new(stream, FrameCodec::with_max_frame_length(self.max_frame_length))
                .with_io_timeout(self.io_timeout)
                .with_peer(endpoint.to_string()),
        )
    }
}
