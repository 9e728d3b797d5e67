use std::time::Duration;

use crate::client::core::VqaClient;
use crate::config::ClientConfig;
use crate::transport::Connector;
use crate::Result;

use super::policy::RetryPolicy;

/// Builder for creating clients with custom configuration.
///
/// Starts from [`ClientConfig::default`]; every setter overrides one field.
pub struct VqaClientBuilder {
    config: ClientConfig,
}

impl VqaClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply `VQA_*` environment overrides on top of what is set so far.
    pub fn env_overrides(mut self) -> Self {
        self.config = self.config.with_env_overrides();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.config.retry_budget = budget;
        self
    }

    /// Exponential backoff between send attempts. Off by default.
    pub fn retry_backoff(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.config.retry_min_delay_ms = min_delay.as_millis() as u64;
        self.config.retry_max_delay_ms = max_delay.as_millis() as u64;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn max_frame_length(mut self, max: usize) -> Self {
        self.config.max_frame_length = max;
        self
    }

    pub fn current_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a TCP client. No connection is opened until the first query.
    pub fn build(self) -> Result<VqaClient> {
        VqaClient::from_config(&self.config)
    }

    /// Build a client over a custom transport.
    pub fn build_with_connector<C: Connector>(self, connector: C) -> Result<VqaClient<C>> {
        self.config.validate()?;
        Ok(VqaClient::with_connector(
            connector,
            self.config.endpoint(),
            RetryPolicy::from_config(&self.config),
        ))
    }
}

impl Default for VqaClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
