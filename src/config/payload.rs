//! Request document profiles
//!
//! Selects which resource-definition document is sent on create:
//!
//! ```yaml
//! payload:
//!   type: detailed
//!   provider: admin
//!   tags: [billing, internal]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayloadConfig {
    /// Name, context, version, policies and endpoints only
    Minimal(MinimalPayloadConfig),
    /// Full descriptive document with business information and operations
    Detailed(DetailedPayloadConfig),
    /// Handlebars JSON template rendered per resource
    Template { path: PathBuf },
}

impl Default for PayloadConfig {
    fn default() -> Self {
        PayloadConfig::Minimal(MinimalPayloadConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinimalPayloadConfig {
    #[serde(default = "default_minimal_version")]
    pub version: String,

    /// Backend URL used for both production and sandbox endpoints
    #[serde(default = "default_minimal_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_policies")]
    pub policies: Vec<String>,
}

impl Default for MinimalPayloadConfig {
    fn default() -> Self {
        Self {
            version: default_minimal_version(),
            endpoint: default_minimal_endpoint(),
            policies: default_policies(),
        }
    }
}

fn default_minimal_version() -> String {
    "1".to_string()
}

fn default_minimal_endpoint() -> String {
    "http://localhost:3000".to_string()
}

fn default_policies() -> Vec<String> {
    vec!["Unlimited".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailedPayloadConfig {
    #[serde(default = "default_detailed_version")]
    pub version: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_detailed_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_policies")]
    pub policies: Vec<String>,

    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    #[serde(default = "default_business_owner")]
    pub business_owner: String,

    #[serde(default = "default_business_owner_email")]
    pub business_owner_email: String,

    #[serde(default = "default_technical_owner")]
    pub technical_owner: String,

    #[serde(default = "default_technical_owner_email")]
    pub technical_owner_email: String,
}

impl Default for DetailedPayloadConfig {
    fn default() -> Self {
        Self {
            version: default_detailed_version(),
            description: default_description(),
            provider: default_provider(),
            endpoint: default_detailed_endpoint(),
            policies: default_policies(),
            tags: default_tags(),
            business_owner: default_business_owner(),
            business_owner_email: default_business_owner_email(),
            technical_owner: default_technical_owner(),
            technical_owner_email: default_technical_owner_email(),
        }
    }
}

fn default_detailed_version() -> String {
    "1.0.0".to_string()
}

fn default_description() -> String {
    "This is a simple API for Pizza Shack online pizza delivery store.".to_string()
}

fn default_provider() -> String {
    "admin".to_string()
}

fn default_detailed_endpoint() -> String {
    "https://localhost:9443/am/sample/pizzashack/v1/api/".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["substract".to_string(), "add".to_string()]
}

fn default_business_owner() -> String {
    "John Doe".to_string()
}

fn default_business_owner_email() -> String {
    "johndoe@wso2.com".to_string()
}

fn default_technical_owner() -> String {
    "Jane Roe".to_string()
}

fn default_technical_owner_email() -> String {
    "janeroe@wso2.com".to_string()
}
