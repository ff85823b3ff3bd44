//! Configuration module for DevLog.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Runtime environment (development, production, test)
//! - Server settings (bind address, port, CORS, body limit, static files)
//! - Entry limits (store capacity and field lengths)
//! - Rate limiting (window and per-client request budgets)

mod app;
mod validation;

pub use app::{
    AppConfig, DEFAULT_BODY_LIMIT, DEFAULT_CORS_ORIGIN, DEFAULT_MAX_REQUESTS,
    DEFAULT_MAX_WRITE_REQUESTS, DEFAULT_PORT, DEFAULT_RATE_LIMIT_WINDOW, Environment,
    RateLimitConfig, ServerConfig,
};
pub use validation::{ConfigError, expand_env_vars, parse_duration};
