//! 客户端配置：服务端地址、重试预算与超时设置，支持 YAML 文件、环境变量与宿主设置。
//!
//! Client configuration.
//!
//! Populated once at start-up and passed by reference into the client. Sources,
//! lowest precedence first:
//!
//! 1. [`ClientConfig::default`]
//! 2. a YAML file ([`ClientConfig::from_yaml_file`]) or the host framework's
//!    settings map ([`ClientConfig::from_settings`])
//! 3. environment variables ([`ClientConfig::with_env_overrides`])
//!
//! | Variable | Field |
//! |----------|-------|
//! | `VQA_SERVER_URL` | `host` |
//! | `VQA_SERVER_PORT` | `port` |
//! | `VQA_RETRY_BUDGET` | `retry_budget` |
//! | `VQA_CONNECT_TIMEOUT_MS` | `connect_timeout_ms` |
//! | `VQA_IO_TIMEOUT_MS` | `io_timeout_ms` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;

use crate::transport::DEFAULT_MAX_FRAME_LENGTH;
use crate::types::Endpoint;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// Settings key the voice framework stores the server host under.
pub const SETTINGS_SERVER_URL: &str = "server_url";
pub const SETTINGS_SERVER_PORT: &str = "server_port";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Maximum number of send attempts per query.
    pub retry_budget: u32,
    /// Delay before the second attempt; doubles per attempt up to `retry_max_delay_ms`.
    pub retry_min_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    /// `None` waits for the OS-level connect timeout.
    pub connect_timeout_ms: Option<u64>,
    /// `None` lets frame reads and writes wait indefinitely.
    pub io_timeout_ms: Option<u64>,
    pub max_frame_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            retry_budget: DEFAULT_RETRY_BUDGET,
            retry_min_delay_ms: 0,
            retry_max_delay_ms: 0,
            connect_timeout_ms: None,
            io_timeout_ms: None,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid client config: {}", e),
                ErrorContext::new().with_source("config_loader"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(format!("file: {}", path.display())),
            },
            other => other,
        })
    }

    /// Build from the voice framework's settings map. Missing or unusable
    /// entries fall back to the defaults.
    pub fn from_settings(settings: &Map<String, Value>) -> Self {
        let mut config = Self::default();
        if let Some(host) = settings
            .get(SETTINGS_SERVER_URL)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|h| !h.is_empty())
        {
            config.host = host.to_string();
        }
        let port = settings.get(SETTINGS_SERVER_PORT).and_then(|v| match v {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        });
        if let Some(port) = port.filter(|p| *p != 0) {
            config.port = port;
        }
        config
    }

    /// Apply `VQA_*` environment overrides. Unparseable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("VQA_SERVER_URL").filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup("VQA_SERVER_PORT").and_then(|s| s.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(budget) = lookup("VQA_RETRY_BUDGET").and_then(|s| s.parse::<u32>().ok()) {
            self.retry_budget = budget;
        }
        if let Some(ms) = lookup("VQA_CONNECT_TIMEOUT_MS").and_then(|s| s.parse::<u64>().ok()) {
            self.connect_timeout_ms = Some(ms).filter(|ms| *ms > 0);
        }
        if let Some(ms) = lookup("VQA_IO_TIMEOUT_MS").and_then(|s| s.parse::<u64>().ok()) {
            self.io_timeout_ms = Some(ms).filter(|ms| *ms > 0);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str, field: &str| -> Result<()> {
            Err(Error::configuration_with_context(
                msg,
                ErrorContext::new()
                    .with_field_path(format!("config.{}", field))
                    .with_source("config_validator"),
            ))
        };
        if self.host.trim().is_empty() {
            return fail("host must not be empty", "host");
        }
        if self.port == 0 {
            return fail("port must be non-zero", "port");
        }
        if self.retry_budget == 0 {
            return fail("retry budget must allow at least one attempt", "retry_budget");
        }
        if self.max_frame_length == 0 {
            return fail("max frame length must be non-zero", "max_frame_length");
        }
        if self.retry_min_delay_ms > self.retry_max_delay_ms {
            return fail(
                "retry_min_delay_ms must not exceed retry_max_delay_ms",
                "retry_min_delay_ms",
            );
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms.map(Duration::from_millis)
    }
}
