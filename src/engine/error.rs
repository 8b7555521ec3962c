//! Provisioning error types

use crate::client::ClientError;
use crate::config::{ConfigError, LoadError};

/// Errors that abort a provisioning run before any resource is processed.
///
/// Per-resource failures never surface here; they are captured in each
/// resource's `PipelineOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}
