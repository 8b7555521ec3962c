//! Provisioning configuration
//!
//! This module contains all types for configuring a provisioning run:
//! - `provision` - The top-level `ProvisionConfig` and its sections
//! - `auth` - Credential configuration (bearer token or basic auth)
//! - `payload` - Which request document profile to send
//! - `loader` - Load configuration from YAML files
//! - `error` - Configuration validation errors

pub mod auth;
pub mod error;
pub mod loader;
pub mod payload;
pub mod provision;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use loader::LoadError;
pub use payload::{DetailedPayloadConfig, MinimalPayloadConfig, PayloadConfig};
pub use provision::{BatchConfig, DeploymentConfig, LifecycleConfig, ProvisionConfig};
