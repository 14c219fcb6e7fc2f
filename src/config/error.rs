//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("API endpoint must be an http(s) URL")]
    InvalidEndpoint,

    #[error("API endpoint must use HTTPS in production")]
    EndpointMustBeHttps,

    #[error("Invalid {0} timeout (expected 1-300 seconds)")]
    InvalidTimeout(&'static str),

    #[error("Invalid page limit {0} (expected 1-60)")]
    InvalidPageLimit(u32),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
