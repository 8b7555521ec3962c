//! Credential configuration

use serde::{Deserialize, Serialize};

/// Authentication configuration for publisher requests
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Pre-issued bearer token
    Bearer { token: String },
    /// Username and password, sent as a Basic credential
    Basic { username: String, password: String },
}

impl AuthConfig {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthConfig::Bearer {
            token: token.into(),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Scheme name as it appears in the `Authorization` header
    pub fn scheme(&self) -> &'static str {
        match self {
            AuthConfig::Bearer { .. } => "Bearer",
            AuthConfig::Basic { .. } => "Basic",
        }
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        let yaml = r#"
type: bearer
token: abc123
"#;
        let auth: AuthConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(auth, AuthConfig::bearer("abc123"));
        assert_eq!(auth.scheme(), "Bearer");
    }

    #[test]
    fn test_parse_basic() {
        let yaml = r#"
type: basic
username: admin
password: admin
"#;
        let auth: AuthConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(auth, AuthConfig::basic("admin", "admin"));
        assert_eq!(auth.scheme(), "Basic");
    }

    #[test]
    fn test_debug_masks_secrets() {
        let debug = format!("{:?}", AuthConfig::basic("admin", "s3cret"));
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));

        let debug = format!("{:?}", AuthConfig::bearer("tok-999"));
        assert!(!debug.contains("tok-999"));
    }
}
