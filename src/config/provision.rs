//! Provisioning run configuration
//!
//! Loaded from a YAML file and overridden from the command line:
//!
//! ```yaml
//! base_url: https://localhost:9443/api/am/publisher/v4
//! timeout: 30000
//! validate_ssl: false
//!
//! auth:
//!   type: bearer
//!   token: eyJ4NXQiOi...
//!
//! batch:
//!   prefix: pro
//!   start: 2
//!   count: 5
//!   pacing_ms: 500
//!
//! lifecycle:
//!   target_state: Publish
//!   deployment:
//!     name: Default
//!     vhost: localhost
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::auth::AuthConfig;
use super::error::ConfigError;
use super::loader::{ConfigLoader, LoadError};
use super::payload::PayloadConfig;
use crate::client::credential::CredentialProvider;
use crate::engine::batch::NameSequence;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Versioned publisher API base, e.g. "https://localhost:9443/api/am/publisher/v4"
    pub base_url: String,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether to validate TLS certificates (default: true)
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    pub auth: Option<AuthConfig>,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub payload: PayloadConfig,
}

fn default_timeout() -> u64 {
    30000
}

fn default_validate_ssl() -> bool {
    true
}

/// Which names to generate and how fast to work through them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_start")]
    pub start: u64,

    #[serde(default = "default_count")]
    pub count: u64,

    /// Pause between consecutive resources in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

fn default_prefix() -> String {
    "api".to_string()
}

fn default_start() -> u64 {
    1
}

fn default_count() -> u64 {
    1
}

fn default_pacing_ms() -> u64 {
    500
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            start: default_start(),
            count: default_count(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl BatchConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Lifecycle action invoked as the final step
    #[serde(default = "default_target_state")]
    pub target_state: String,

    #[serde(default = "default_revision_description")]
    pub revision_description: String,

    #[serde(default)]
    pub deployment: DeploymentConfig,
}

fn default_target_state() -> String {
    "Publish".to_string()
}

fn default_revision_description() -> String {
    "Initial Revision".to_string()
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            target_state: default_target_state(),
            revision_description: default_revision_description(),
            deployment: DeploymentConfig::default(),
        }
    }
}

/// Gateway environment a revision is deployed to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentConfig {
    #[serde(default = "default_deployment_name")]
    pub name: String,

    #[serde(default = "default_vhost")]
    pub vhost: String,

    #[serde(default = "default_display_on_devportal")]
    pub display_on_devportal: bool,
}

fn default_deployment_name() -> String {
    "Default".to_string()
}

fn default_vhost() -> String {
    "localhost".to_string()
}

fn default_display_on_devportal() -> bool {
    true
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            name: default_deployment_name(),
            vhost: default_vhost(),
            display_on_devportal: default_display_on_devportal(),
        }
    }
}

impl ProvisionConfig {
    pub fn new(base_url: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            auth: Some(auth),
            ..Self::from_base_url(base_url)
        }
    }

    /// Defaults everywhere and no credentials yet
    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: HashMap::new(),
            timeout: default_timeout(),
            validate_ssl: default_validate_ssl(),
            auth: None,
            batch: BatchConfig::default(),
            lifecycle: LifecycleConfig::default(),
            payload: PayloadConfig::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        ConfigLoader::load_file(path.as_ref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Extra headers as a typed map; names and values must be valid HTTP
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let invalid = |reason: String| ConfigError::InvalidHeader {
                name: name.clone(),
                reason,
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Check everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.lifecycle.target_state.trim().is_empty() {
            return Err(ConfigError::EmptyTargetState);
        }

        NameSequence::try_from(&self.batch)?;
        self.header_map()?;

        self.auth
            .as_ref()
            .ok_or(ConfigError::MissingCredentials)?
            .obtain()?;

        Ok(())
    }
}
