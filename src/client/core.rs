use bytes::Bytes;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::policy::{Decision, RetryPolicy};
use crate::codec::MessageCodec;
use crate::config::ClientConfig;
use crate::transport::{Connector, FrameChannel, TcpConnector, TransportError};
use crate::types::{Endpoint, VqaRequest, VqaResponse};
use crate::{Error, ErrorContext, Result};

/// Client for a remote VQA server.
///
/// Owns at most one live connection. All methods that touch the network take
/// `&mut self`, so a client serves one query at a time; wrap it in
/// [`super::SharedVqaClient`] when several tasks need it.
pub struct VqaClient<C: Connector = TcpConnector> {
    connector: C,
    endpoint: Endpoint,
    policy: RetryPolicy,
    connection: Option<C::Channel>,
}

impl VqaClient<TcpConnector> {
    pub fn builder() -> super::VqaClientBuilder {
        super::VqaClientBuilder::new()
    }

    /// Create a TCP client. Does not connect yet.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_connector(
            TcpConnector::from_config(config),
            config.endpoint(),
            RetryPolicy::from_config(config),
        ))
    }
}

impl<C: Connector> VqaClient<C> {
    pub fn with_connector(connector: C, endpoint: Endpoint, policy: RetryPolicy) -> Self {
        Self {
            connector,
            endpoint,
            policy,
            connection: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The live connection, if any.
    pub fn connection(&self) -> Option<&C::Channel> {
        self.connection.as_ref()
    }

    /// Open a fresh connection, discarding the current one.
    pub async fn connect(&mut self) -> Result<()> {
        self.open_channel()
            .await
            .map_err(|source| Error::ConnectionFailure {
                endpoint: self.endpoint.to_string(),
                attempts: 0,
                source,
            })
    }

    /// Connect only if there is no live connection.
    pub async fn ensure_connected(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }
        self.connect().await
    }

    /// Best-effort reconnect. Returns whether a connection is now live.
    pub async fn reconnect(&mut self) -> bool {
        self.open_channel().await.is_ok()
    }

    /// Release the connection. Never fails; safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.connection.is_some() {
            self.discard_connection().await;
            info!(endpoint = %self.endpoint, "VQA client closed");
        }
    }

    /// Send one question and wait for its answer.
    ///
    /// The send is retried up to the policy budget, reconnecting between
    /// attempts. The response is read exactly once; a read or decode failure
    /// resets the connection and is reported as [`Error::Unknown`].
    pub async fn query(&mut self, request: &VqaRequest) -> Result<VqaResponse> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        self.ensure_connected().await?;

        let payload = MessageCodec::encode(request);
        debug!(
            request_id = request_id.as_str(),
            image_bytes = request.image.len(),
            frame_bytes = payload.len(),
            question = request.question.as_str(),
            "sending VQA question"
        );
        self.send_with_retry(payload, &request_id).await?;

        let read = match self.connection.as_mut() {
            Some(conn) => conn.read_frame().await,
            None => Err(TransportError::NotConnected),
        };
        let frame = match read {
            Ok(frame) => frame,
            Err(err) => {
                warn!(
                    request_id = request_id.as_str(),
                    endpoint = %self.endpoint,
                    error = %err,
                    "failed to read VQA response"
                );
                self.reset_connection().await;
                return Err(Error::unknown_with_context(
                    "failed to read response",
                    err,
                    query_context(&request_id),
                ));
            }
        };

        match MessageCodec::decode(&frame) {
            Ok(response) => {
                info!(
                    request_id = request_id.as_str(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    result = response.result.as_str(),
                    "VQA answer received"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(
                    request_id = request_id.as_str(),
                    frame_bytes = frame.len(),
                    error = %err,
                    "malformed VQA response"
                );
                self.reset_connection().await;
                Err(Error::unknown_with_context(
                    "malformed response",
                    err,
                    query_context(&request_id),
                ))
            }
        }
    }

    async fn send_with_retry(&mut self, payload: Bytes, request_id: &str) -> Result<()> {
        let mut failures = 0u32;
        let mut reconnect_error: Option<TransportError> = None;
        loop {
            let outcome = match self.connection.as_mut() {
                Some(conn) => conn.write_frame(payload.clone()).await,
                None => Err(reconnect_error.take().unwrap_or(TransportError::NotConnected)),
            };
            let err = match outcome {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            if !err.is_retryable() {
                // Nothing was written, so the connection is still usable.
                warn!(request_id, error = %err, "request rejected before sending");
                return Err(Error::unknown_with_context(
                    "request cannot be sent",
                    err,
                    query_context(request_id),
                ));
            }

            failures += 1;
            self.discard_connection().await;
            warn!(
                request_id,
                endpoint = %self.endpoint,
                attempt = failures,
                budget = self.policy.budget,
                error = %err,
                "send attempt failed"
            );

            match self.policy.decide(failures) {
                Decision::Fail => {
                    warn!(request_id, endpoint = %self.endpoint, "cannot reach VQA server");
                    return Err(Error::ConnectionFailure {
                        endpoint: self.endpoint.to_string(),
                        attempts: failures,
                        source: err,
                    });
                }
                Decision::Retry { delay } => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    if let Err(e) = self.open_channel().await {
                        reconnect_error = Some(e);
                    }
                }
            }
        }
    }

    /// Discard the current connection and try once to open a new one.
    async fn reset_connection(&mut self) {
        if self.open_channel().await.is_err() {
            debug!(endpoint = %self.endpoint, "reconnect after failed query did not succeed");
        }
    }

    async fn open_channel(&mut self) -> std::result::Result<(), TransportError> {
        self.discard_connection().await;
        match self.connector.connect(&self.endpoint).await {
            Ok(channel) => {
                self.connection = Some(channel);
                Ok(())
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "connect failed");
                Err(err)
            }
        }
    }

    async fn discard_connection(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.close().await;
        }
    }
}

fn query_context(request_id: &str) -> ErrorContext {
    ErrorContext::new()
        .with_source("query")
        .with_details(format!("request_id: {}", request_id))
}
