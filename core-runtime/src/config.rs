//! # Gateway Configuration Module
//!
//! Provides configuration management for the document gateway.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `GatewayConfig` instance that holds every setting and injected transport
//! the gateway needs. It enforces fail-fast validation so that a gateway is
//! never started against a malformed host or with an unbounded poll loop.
//!
//! ## Required Settings
//!
//! - Universer host (`http://` or `https://`)
//! - Database path
//! - At least one poll bound (`poll_max_attempts` and/or `poll_max_wait`)
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::GatewayConfig;
//! use std::time::Duration;
//!
//! let config = GatewayConfig::builder()
//!     .universer_host("http://localhost:8000")
//!     .database_path("/var/lib/usip/gateway.db")
//!     .poll_max_wait(Duration::from_secs(120))
//!     .build()?;
//! ```
//!
//! Settings can also be loaded from JSON and applied to a builder:
//!
//! ```ignore
//! let settings = GatewaySettings::from_file("gateway.json")?;
//! let config = settings.apply(GatewayConfig::builder()).build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use bridge_traits::HttpClient;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default URL prefix under which the Universer service mounts its API
pub const DEFAULT_API_PREFIX: &str = "/universer-api";

/// Default delay between two task polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default per-request timeout for the exchange transport
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default size of the document store's connection pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Gateway configuration.
///
/// Use [`GatewayConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of the Universer service, without a trailing slash
    pub universer_host: String,

    /// API prefix appended to the host, always starting with `/`
    pub api_prefix: String,

    /// Timeout applied to every exchange request
    pub request_timeout: Duration,

    /// Delay between task polls
    pub poll_interval: Duration,

    /// Maximum number of polls per exchange task
    pub poll_max_attempts: Option<u32>,

    /// Maximum total wall-clock time spent polling one exchange task
    pub poll_max_wait: Option<Duration>,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Upper bound on open store connections. An in-memory store always uses one.
    pub database_max_connections: u32,

    /// Editor host for documents
    pub doc_host: String,

    /// Editor host for spreadsheets
    pub sheet_host: String,

    /// Public host of this gateway, used to build avatar URLs
    pub public_host: String,

    /// HTTP transport used by the exchange client
    pub http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("universer_host", &self.universer_host)
            .field("api_prefix", &self.api_prefix)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("poll_max_wait", &self.poll_max_wait)
            .field("database_path", &self.database_path)
            .field("database_max_connections", &self.database_max_connections)
            .field("doc_host", &self.doc_host)
            .field("sheet_host", &self.sheet_host)
            .field("public_host", &self.public_host)
            .field("http_client", &"HttpClient { ... }")
            .finish()
    }
}

impl GatewayConfig {
    /// Creates a new builder for constructing a `GatewayConfig`.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Full API base URL, e.g. `http://localhost:8000/universer-api`
    pub fn api_base(&self) -> String {
        format!("{}{}", self.universer_host, self.api_prefix)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Universer host is an absolute http(s) URL
    /// - API prefix starts with `/`
    /// - Database path is not empty and the pool holds at least one connection
    /// - Timeouts and poll interval are non-zero
    /// - At least one poll bound is set, and set bounds are non-zero
    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.universer_host) {
            return Err(Error::Config(format!(
                "Universer host must start with http:// or https://, got '{}'",
                self.universer_host
            )));
        }

        if !self.api_prefix.starts_with('/') {
            return Err(Error::Config(format!(
                "API prefix must start with '/', got '{}'",
                self.api_prefix
            )));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.database_max_connections == 0 {
            return Err(Error::Config(
                "database_max_connections must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(Error::Config(
                "Poll interval must be greater than zero".to_string(),
            ));
        }

        if self.poll_max_attempts.is_none() && self.poll_max_wait.is_none() {
            return Err(Error::Config(
                "Polling must be bounded. Set poll_max_attempts, poll_max_wait, or both."
                    .to_string(),
            ));
        }

        if self.poll_max_attempts == Some(0) {
            return Err(Error::Config(
                "poll_max_attempts must be greater than zero".to_string(),
            ));
        }

        if self.poll_max_wait.is_some_and(|wait| wait.is_zero()) {
            return Err(Error::Config(
                "poll_max_wait must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty())
}

fn trim_host(host: String) -> String {
    host.trim_end_matches('/').to_string()
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for the Universer exchange. \
                 Enable the 'desktop-shims' feature to use the default reqwest client, \
                 or inject one with .http_client()."
            .to_string(),
    })
}

/// Builder for [`GatewayConfig`].
#[derive(Default)]
pub struct GatewayConfigBuilder {
    universer_host: Option<String>,
    api_prefix: Option<String>,
    request_timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    poll_max_attempts: Option<u32>,
    poll_max_wait: Option<Duration>,
    database_path: Option<PathBuf>,
    database_max_connections: Option<u32>,
    doc_host: Option<String>,
    sheet_host: Option<String>,
    public_host: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl GatewayConfigBuilder {
    /// Sets the Universer service host, e.g. `http://localhost:8000`.
    pub fn universer_host(mut self, host: impl Into<String>) -> Self {
        self.universer_host = Some(host.into());
        self
    }

    /// Overrides the API prefix. Default: `/universer-api`
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Sets the exchange request timeout. Default: 30 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the delay between polls. Default: 500 ms
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn poll_max_attempts(mut self, attempts: u32) -> Self {
        self.poll_max_attempts = Some(attempts);
        self
    }

    pub fn poll_max_wait(mut self, wait: Duration) -> Self {
        self.poll_max_wait = Some(wait);
        self
    }

    /// Sets the database path.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Caps the store's connection pool. Default: 5
    pub fn database_max_connections(mut self, max: u32) -> Self {
        self.database_max_connections = Some(max);
        self
    }

    pub fn doc_host(mut self, host: impl Into<String>) -> Self {
        self.doc_host = Some(host.into());
        self
    }

    pub fn sheet_host(mut self, host: impl Into<String>) -> Self {
        self.sheet_host = Some(host.into());
        self
    }

    pub fn public_host(mut self, host: impl Into<String>) -> Self {
        self.public_host = Some(host.into());
        self
    }

    /// Injects the HTTP transport.
    ///
    /// When omitted, the reqwest client is used if the `desktop-shims`
    /// feature is enabled; otherwise `build()` fails with
    /// [`Error::CapabilityMissing`].
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// Editor hosts and the public host default to the Universer host.
    pub fn build(self) -> Result<GatewayConfig> {
        let universer_host = self.universer_host.map(trim_host).ok_or_else(|| {
            Error::Config(
                "Universer host is required. Use .universer_host() to set it.".to_string(),
            )
        })?;

        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = GatewayConfig {
            api_prefix: self
                .api_prefix
                .map(|prefix| prefix.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            request_timeout,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_max_attempts: self.poll_max_attempts,
            poll_max_wait: self.poll_max_wait,
            database_path,
            database_max_connections: self
                .database_max_connections
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            doc_host: self
                .doc_host
                .map(trim_host)
                .unwrap_or_else(|| universer_host.clone()),
            sheet_host: self
                .sheet_host
                .map(trim_host)
                .unwrap_or_else(|| universer_host.clone()),
            public_host: self
                .public_host
                .map(trim_host)
                .unwrap_or_else(|| universer_host.clone()),
            universer_host,
            http_client,
        };

        config.validate()?;

        Ok(config)
    }
}

/// Serializable gateway settings, typically loaded from a JSON file.
///
/// Every field is optional; unset fields leave the builder untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewaySettings {
    pub universer_host: Option<String>,
    pub api_prefix: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub poll_max_attempts: Option<u32>,
    pub poll_max_wait_ms: Option<u64>,
    pub database_path: Option<PathBuf>,
    pub database_max_connections: Option<u32>,
    pub doc_host: Option<String>,
    pub sheet_host: Option<String>,
    pub public_host: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
}

impl GatewaySettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid gateway settings: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read gateway settings from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Copies every set field onto the builder.
    pub fn apply(&self, mut builder: GatewayConfigBuilder) -> GatewayConfigBuilder {
        if let Some(host) = &self.universer_host {
            builder = builder.universer_host(host.clone());
        }
        if let Some(prefix) = &self.api_prefix {
            builder = builder.api_prefix(prefix.clone());
        }
        if let Some(ms) = self.request_timeout_ms {
            builder = builder.request_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.poll_interval_ms {
            builder = builder.poll_interval(Duration::from_millis(ms));
        }
        if let Some(attempts) = self.poll_max_attempts {
            builder = builder.poll_max_attempts(attempts);
        }
        if let Some(ms) = self.poll_max_wait_ms {
            builder = builder.poll_max_wait(Duration::from_millis(ms));
        }
        if let Some(path) = &self.database_path {
            builder = builder.database_path(path.clone());
        }
        if let Some(max) = self.database_max_connections {
            builder = builder.database_max_connections(max);
        }
        if let Some(host) = &self.doc_host {
            builder = builder.doc_host(host.clone());
        }
        if let Some(host) = &self.sheet_host {
            builder = builder.sheet_host(host.clone());
        }
        if let Some(host) = &self.public_host {
            builder = builder.public_host(host.clone());
        }
        builder
    }

    /// Logging configuration derived from the `log*` fields.
    pub fn logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::default();
        if let Some(level) = self.log_level {
            config = config.with_level(level);
        }
        if let Some(format) = self.log_format {
            config = config.with_format(format);
        }
        if let Some(filter) = &self.log_filter {
            config = config.with_filter(filter.clone());
        }
        config
    }
}
