//! Configuration validation errors

/// Errors detected while validating configuration, before any remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Bearer token is empty")]
    EmptyToken,

    #[error("Bearer token is still the placeholder '{0}'; set a real token")]
    PlaceholderToken(String),

    #[error("Basic auth username is empty")]
    EmptyUsername,

    #[error("No credentials configured; supply a bearer token or a username/password pair")]
    MissingCredentials,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Name index overflows: start {start} + count {count}")]
    IndexOverflow { start: u64, count: u64 },

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Lifecycle target state is empty")]
    EmptyTargetState,
}
