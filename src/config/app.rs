//! Application configuration structures.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::validation::Limits;

use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default allowed CORS origin (the dev-server UI).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Default maximum request body size (10 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024;

/// Default rate-limit window (15 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Default request budget per client per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

/// Default mutating-request budget per client per window.
pub const DEFAULT_MAX_WRITE_REQUESTS: u32 = 20;

// =============================================================================
// Environment
// =============================================================================

/// Runtime environment.
///
/// Controls error detail exposure and whether the general rate limit applies.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    /// Verbose error messages.
    #[default]
    Development,
    /// Generic error messages.
    Production,
    /// Like production, but the general API rate limit is skipped.
    Test,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 3000).
    pub port: u16,

    /// Allowed CORS origins, comma-separated; `*` allows any origin.
    pub cors_origin: String,

    /// Maximum request body size in bytes (default: 10240).
    pub body_limit: usize,

    /// Key rate limits on the first `X-Forwarded-For` hop (default: true).
    pub trust_proxy: bool,

    /// Directory with a built single-page UI to serve for non-API paths.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            trust_proxy: true,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Configured CORS origins, trimmed, empty items dropped.
    pub fn cors_origins(&self) -> Vec<&str> {
        self.cors_origin
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}

// =============================================================================
// Rate Limit Configuration
// =============================================================================

/// Per-client request rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is active (default: true).
    pub enabled: bool,

    /// Sliding window length (default: 15m).
    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// Requests allowed per client under `/api/` per window (default: 100).
    pub max_requests: u32,

    /// Mutating entry requests allowed per client per window (default: 20).
    pub max_write_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: DEFAULT_RATE_LIMIT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
            max_write_requests: DEFAULT_MAX_WRITE_REQUESTS,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Runtime environment.
    #[serde(default)]
    pub environment: Environment,

    /// Web server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Entry store and field limits.
    #[serde(default)]
    pub limits: Limits,

    /// Rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(&expand_env_vars(content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        if self.server.body_limit == 0 {
            return Err(ConfigError::ValidationError(
                "server body_limit must be positive".to_string(),
            ));
        }

        let origins = self.server.cors_origins();
        if origins.is_empty() {
            return Err(ConfigError::ValidationError(
                "server cors_origin must name at least one origin".to_string(),
            ));
        }
        for origin in origins {
            HeaderValue::from_str(origin).map_err(|_| {
                ConfigError::ValidationError(format!("invalid CORS origin: '{origin}'"))
            })?;
        }

        let limits = [
            ("max_entries", self.limits.max_entries),
            ("max_message_length", self.limits.max_message_length),
            ("max_tag_length", self.limits.max_tag_length),
            ("max_category_length", self.limits.max_category_length),
            ("max_tags_per_entry", self.limits.max_tags_per_entry),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "limits {name} must be positive"
                )));
            }
        }

        if self.rate_limit.enabled {
            if self.rate_limit.window.is_zero() {
                return Err(ConfigError::ValidationError(
                    "rate_limit window must be greater than zero".to_string(),
                ));
            }
            if self.rate_limit.max_requests == 0 || self.rate_limit.max_write_requests == 0 {
                return Err(ConfigError::ValidationError(
                    "rate_limit request budgets must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }
}
