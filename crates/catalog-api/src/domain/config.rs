//! Service configuration with validation.
//!
//! Loaded from environment variables. Missing store settings are not an
//! error here: the service boots without a store and answers store-backed
//! routes with a configuration error.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::warn;

/// Environment variable names
pub mod env {
    pub const STORE_URL: &str = "SUPABASE_URL";
    pub const STORE_KEY: &str = "SUPABASE_KEY";
    pub const PORT: &str = "PORT";
    pub const HOST: &str = "HOST";
    pub const STORE_TIMEOUT_SECS: &str = "STORE_TIMEOUT_SECS";
    pub const STORE_HEALTH_CHECK: &str = "STORE_HEALTH_CHECK";
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Remote store connection (None = not configured)
    pub store: Option<StoreConfig>,
    /// Request limits
    pub limits: LimitsConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Log output configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable optional values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(port) = get(env::PORT) {
            match port.parse() {
                Ok(p) => config.http.port = p,
                Err(_) => warn!(value = %port, "PORT is not a valid port, using default"),
            }
        }
        if let Some(host) = get(env::HOST) {
            match host.parse() {
                Ok(h) => config.http.host = h,
                Err(_) => warn!(value = %host, "HOST is not a valid address, using default"),
            }
        }

        if let (Some(url), Some(key)) = (get(env::STORE_URL), get(env::STORE_KEY)) {
            let mut store = StoreConfig::new(url, key);
            if let Some(secs) = get(env::STORE_TIMEOUT_SECS) {
                match secs.parse::<u64>() {
                    Ok(s) if s > 0 => store.timeout = Duration::from_secs(s),
                    _ => warn!(value = %secs, "STORE_TIMEOUT_SECS is invalid, using default"),
                }
            }
            if let Some(flag) = get(env::STORE_HEALTH_CHECK) {
                store.health_check_on_start = parse_bool(&flag);
            }
            config.store = Some(store);
        }

        if let Some(origins) = get(env::CORS_ALLOWED_ORIGINS) {
            config.cors.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        config.logging = LoggingConfig::from_lookup(&lookup);

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if let Some(store) = &self.store {
            store.validate()?;
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn store_configured(&self) -> bool {
        self.store.is_some()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 5000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5000,
        }
    }
}

/// Remote store connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Access key, sent as `apikey` and as bearer token
    pub key: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Probe the store once at startup
    pub health_check_on_start: bool,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            health_check_on_start: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = reqwest::Url::parse(&self.url)
            .map_err(|e| ConfigError::InvalidStoreUrl(format!("{}: {}", self.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidStoreUrl(format!(
                "{}: scheme must be http or https",
                self.url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "store timeout cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Root of the PostgREST API
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}

// The key never reaches logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("health_check_on_start", &self.health_check_on_start)
            .finish()
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 64KB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 64 * 1024,
        }
    }
}

/// Cross-origin access for browser clients.
///
/// Methods and headers are fixed by the route table; only the origins are
/// configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// `"*"` admits any origin
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime
    pub max_age_secs: u64,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".into()],
            max_age_secs: 3600,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl LoggingConfig {
    /// Read before the subscriber is installed, so it cannot log.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup(env::LOG_FORMAT)
                .is_some_and(|f| f.trim().eq_ignore_ascii_case("json")),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Store URL does not parse or has the wrong scheme
    #[error("invalid store url: {0}")]
    InvalidStoreUrl(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Store key cannot be sent as an HTTP header
    #[error("invalid store key: {0}")]
    InvalidStoreKey(String),
    /// HTTP client could not be constructed
    #[error("store client error: {0}")]
    Client(String),
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
