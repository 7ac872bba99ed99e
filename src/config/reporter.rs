//! Inventory reporter configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prefix for environment variables read by [`InventoryConfig::from_env`].
pub const ENV_PREFIX: &str = "INVENTORY_";

/// HTTP transport options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpOptions {
    /// Use `https` when talking to the inventory host.
    pub ssl: bool,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Extra headers sent with every request.
    pub headers: HashMap<String, String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            ssl: false,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            headers: HashMap::new(),
        }
    }
}

/// Retry behaviour for failed periodic reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single retry delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Add random jitter to retry delays.
    pub jitter: bool,
    /// Give up after this many failed attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter: true,
            max_attempts: None,
        }
    }
}

/// Root configuration for the inventory reporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InventoryConfig {
    /// Inventory service host.
    pub host: String,
    /// Inventory service port.
    pub port: u16,
    /// Path prefix of the inventory REST API.
    pub inventory_uri: String,
    /// Tenant owning the reported entities.
    pub tenant: String,
    /// Send the tenant header with each request.
    pub send_tenant_header: bool,
    /// Feed identifier; generated when absent.
    pub feed_id: Option<String>,
    /// Transport options.
    pub http: HttpOptions,
    /// Flush window in seconds.
    pub batch_delay_secs: u64,
    /// Retry policy for periodic reports.
    pub retry: RetryConfig,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8080,
            inventory_uri: "/hawkular/inventory".into(),
            tenant: "default".into(),
            send_tenant_header: true,
            feed_id: None,
            http: HttpOptions::default(),
            batch_delay_secs: 1,
            retry: RetryConfig::default(),
        }
    }
}

impl InventoryConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".into());
        }
        if self.port == 0 {
            return Err("port must be greater than 0".into());
        }
        if !self.inventory_uri.starts_with('/') {
            return Err("inventory_uri must start with `/`".into());
        }
        if self.batch_delay_secs == 0 {
            return Err("batch_delay_secs must be greater than 0".into());
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err("retry.max_delay_ms must not be lower than retry.base_delay_ms".into());
        }
        if self.retry.max_attempts == Some(0) {
            return Err("retry.max_attempts must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `INVENTORY_*` environment variables layered
    /// over the defaults. A `.env` file in the working directory is loaded
    /// first when present.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars())
    }

    /// Layer `INVENTORY_*` variables from `vars` over the defaults and validate.
    pub fn from_vars<I>(vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut cfg = Self::default();
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "HOST" => cfg.host = value,
                "PORT" => cfg.port = parse_var(&key, &value)?,
                "URI" => cfg.inventory_uri = value,
                "TENANT" => cfg.tenant = value,
                "SEND_TENANT_HEADER" => cfg.send_tenant_header = parse_var(&key, &value)?,
                "FEED_ID" => cfg.feed_id = Some(value),
                "SSL" => cfg.http.ssl = parse_var(&key, &value)?,
                "TIMEOUT_SECS" => cfg.http.timeout_secs = parse_var(&key, &value)?,
                "BATCH_DELAY_SECS" => cfg.batch_delay_secs = parse_var(&key, &value)?,
                "RETRY_BASE_DELAY_MS" => cfg.retry.base_delay_ms = parse_var(&key, &value)?,
                "RETRY_MAX_DELAY_MS" => cfg.retry.max_delay_ms = parse_var(&key, &value)?,
                "RETRY_MAX_ATTEMPTS" => cfg.retry.max_attempts = Some(parse_var(&key, &value)?),
                _ => tracing::debug!(variable = %key, "ignoring unknown inventory variable"),
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// The flush window as a duration.
    pub const fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_secs)
    }

    /// Scheme, host and port of the inventory service.
    pub fn base_url(&self) -> String {
        let scheme = if self.http.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {key}: {e}"))
}
