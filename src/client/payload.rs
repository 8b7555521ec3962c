//! Request document builders
//!
//! Each payload profile produces the resource-definition document sent on
//! create. Revision and deployment documents only depend on the lifecycle
//! configuration and are shared by every profile.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde_json::{json, Value};

use crate::config::{DeploymentConfig, DetailedPayloadConfig, MinimalPayloadConfig, PayloadConfig};

const RESOURCE_TEMPLATE: &str = "resource";

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Failed to read template {path}: {error}")]
    TemplateRead {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Invalid template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("Template render failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Rendered template is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Strategy for the resource-definition document
pub trait PayloadBuilder: Send + Sync {
    fn resource_definition(&self, name: &str) -> Result<Value, PayloadError>;
}

/// Build the payload strategy selected by configuration
pub fn builder_from_config(config: &PayloadConfig) -> Result<Box<dyn PayloadBuilder>, PayloadError> {
    Ok(match config {
        PayloadConfig::Minimal(minimal) => Box::new(MinimalPayload::new(minimal.clone())),
        PayloadConfig::Detailed(detailed) => Box::new(DetailedPayload::new(detailed.clone())),
        PayloadConfig::Template { path } => Box::new(TemplatePayload::from_file(path)?),
    })
}

pub fn revision_document(description: &str) -> Value {
    json!({ "description": description })
}

pub fn deployment_document(deployment: &DeploymentConfig) -> Value {
    json!([{
        "name": deployment.name,
        "displayOnDevportal": deployment.display_on_devportal,
        "vhost": deployment.vhost,
    }])
}

fn endpoint_config(url: &str) -> Value {
    json!({
        "endpoint_type": "http",
        "sandbox_endpoints": { "url": url },
        "production_endpoints": { "url": url },
    })
}

#[derive(Debug, Clone, Default)]
pub struct MinimalPayload {
    config: MinimalPayloadConfig,
}

impl MinimalPayload {
    pub fn new(config: MinimalPayloadConfig) -> Self {
        Self { config }
    }
}

impl PayloadBuilder for MinimalPayload {
    fn resource_definition(&self, name: &str) -> Result<Value, PayloadError> {
        Ok(json!({
            "name": name,
            "version": self.config.version,
            "context": name,
            "policies": self.config.policies,
            "endpointConfig": endpoint_config(&self.config.endpoint),
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetailedPayload {
    config: DetailedPayloadConfig,
}

impl DetailedPayload {
    pub fn new(config: DetailedPayloadConfig) -> Self {
        Self { config }
    }
}

impl PayloadBuilder for DetailedPayload {
    fn resource_definition(&self, name: &str) -> Result<Value, PayloadError> {
        let c = &self.config;
        Ok(json!({
            "name": name,
            "description": c.description,
            "context": name,
            "version": c.version,
            "provider": c.provider,
            "lifeCycleStatus": "CREATED",
            "responseCachingEnabled": false,
            "hasThumbnail": false,
            "isDefaultVersion": false,
            "enableSchemaValidation": false,
            "type": "HTTP",
            "transport": ["http", "https"],
            "tags": c.tags,
            "policies": c.policies,
            "apiThrottlingPolicy": "Unlimited",
            "securityScheme": ["oauth2"],
            "maxTps": { "production": 1000, "sandbox": 1000 },
            "visibility": "PUBLIC",
            "visibleRoles": [],
            "visibleTenants": [],
            "subscriptionAvailability": "CURRENT_TENANT",
            "additionalProperties": [
                { "name": "AdditionalProperty", "value": "PropertyValue", "display": true }
            ],
            "accessControl": "NONE",
            "businessInformation": {
                "businessOwner": c.business_owner,
                "businessOwnerEmail": c.business_owner_email,
                "technicalOwner": c.technical_owner,
                "technicalOwnerEmail": c.technical_owner_email,
            },
            "endpointConfig": endpoint_config(&c.endpoint),
            "operations": [
                {
                    "target": "/order/{orderId}",
                    "verb": "POST",
                    "authType": "Application & Application User",
                    "throttlingPolicy": "Unlimited",
                },
                {
                    "target": "/menu",
                    "verb": "GET",
                    "authType": "Application & Application User",
                    "throttlingPolicy": "Unlimited",
                },
            ],
        }))
    }
}

/// Handlebars template rendered into a JSON document.
///
/// Available variables: `name` and `context`. Values are JSON-string
/// escaped, so the template writes them inside quotes: `"name": "{{name}}"`.
pub struct TemplatePayload {
    registry: Handlebars<'static>,
}

impl TemplatePayload {
    pub fn new(template: &str) -> Result<Self, PayloadError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(escape_json_string);
        registry
            .register_template_string(RESOURCE_TEMPLATE, template)
            .map_err(Box::new)?;
        Ok(Self { registry })
    }

    pub fn from_file(path: &Path) -> Result<Self, PayloadError> {
        let template = std::fs::read_to_string(path).map_err(|error| PayloadError::TemplateRead {
            path: path.to_path_buf(),
            error,
        })?;
        Self::new(&template)
    }
}

impl PayloadBuilder for TemplatePayload {
    fn resource_definition(&self, name: &str) -> Result<Value, PayloadError> {
        let rendered = self
            .registry
            .render(RESOURCE_TEMPLATE, &json!({ "name": name, "context": name }))?;
        Ok(serde_json::from_str(&rendered)?)
    }
}

fn escape_json_string(raw: &str) -> String {
    let quoted = Value::String(raw.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
