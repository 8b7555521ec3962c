//! Publisher API client
//!
//! This module provides everything needed to talk to the publisher:
//! - `credential`: Turns configured auth into an `Authorization` header value
//! - `payload`: Builds the request documents for each lifecycle step
//! - `publisher`: The reqwest-backed `LifecycleApi` implementation

use async_trait::async_trait;

use crate::config::ConfigError;
use crate::engine::result::StepResult;

pub mod credential;
pub mod payload;
pub mod publisher;

pub use credential::{Credential, CredentialProvider};
pub use payload::{
    builder_from_config, DetailedPayload, MinimalPayload, PayloadBuilder, PayloadError,
    TemplatePayload,
};
pub use publisher::{PublisherClient, PublisherResponse};

/// Errors raised while constructing a client, before any request is made
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    StartupFailed(String),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Why a single lifecycle step failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteCallError {
    /// Any status other than 200/201
    #[error("Status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection refused, timeout, TLS failure and the like
    #[error("{0}")]
    Transport(String),

    /// Success status but the body did not carry the expected identifier
    #[error("Response did not contain a string '{field}' field: {body}")]
    MissingField { field: String, body: String },

    #[error("Could not build request document: {0}")]
    Request(String),
}

/// One remote operation per lifecycle step.
///
/// Implementations never return an error: every transport or status outcome
/// is folded into the returned `StepResult`.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Create the resource definition; produces the resource id
    async fn create_resource(&self, name: &str, credential: &Credential) -> StepResult;

    /// Snapshot the resource into a revision; produces the revision id
    async fn create_revision(&self, resource_id: &str, credential: &Credential) -> StepResult;

    /// Activate a revision on the configured gateway environment
    async fn deploy_revision(
        &self,
        resource_id: &str,
        revision_id: &str,
        credential: &Credential,
    ) -> StepResult;

    /// Invoke a lifecycle action such as "Publish"
    async fn transition_lifecycle_state(
        &self,
        resource_id: &str,
        target_state: &str,
        credential: &Credential,
    ) -> StepResult;
}
