//! Credential provider
//!
//! Converts an [`AuthConfig`] into the value of the `Authorization` header.
//! No network I/O happens here; a token left as a placeholder is rejected
//! before the batch starts.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use tracing::debug;

use crate::config::{AuthConfig, ConfigError};

/// Matches template placeholders such as `<your-token-here>`
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<[^<>]*>$").expect("placeholder regex is valid"));

/// Literal sentinels shipped in sample configurations
const PLACEHOLDER_SENTINELS: &[&str] = &["xxx", "changeme"];

/// A ready-to-send `Authorization` header value
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: &'static str,
    value: String,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            scheme: "Bearer",
            value: token.into(),
        }
    }

    pub fn basic(username: &str, password: &str) -> Self {
        Self {
            scheme: "Basic",
            value: STANDARD.encode(format!("{}:{}", username, password)),
        }
    }

    pub fn scheme(&self) -> &str {
        self.scheme
    }

    /// Full header value, e.g. `Bearer eyJ...` or `Basic YWRtaW46YWRtaW4=`
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.value)
    }

    /// Header value safe for logs.
    ///
    /// Basic credentials decode straight back to the password, so they are
    /// masked completely; bearer tokens keep a short prefix.
    pub fn masked(&self) -> String {
        let visible: String = match self.scheme {
            "Bearer" if self.value.chars().count() > 8 => self.value.chars().take(4).collect(),
            _ => String::new(),
        };
        format!("{} {}****", self.scheme, visible)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

/// Source of the credential used on every request
pub trait CredentialProvider {
    fn obtain(&self) -> Result<Credential, ConfigError>;
}

fn is_placeholder(token: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(token)
        || PLACEHOLDER_SENTINELS
            .iter()
            .any(|sentinel| token.eq_ignore_ascii_case(sentinel))
}

impl CredentialProvider for AuthConfig {
    fn obtain(&self) -> Result<Credential, ConfigError> {
        let credential = match self {
            AuthConfig::Bearer { token } => {
                let token = token.trim();
                if token.is_empty() {
                    return Err(ConfigError::EmptyToken);
                }
                if is_placeholder(token) {
                    return Err(ConfigError::PlaceholderToken(token.to_string()));
                }
                Credential::bearer(token)
            }
            AuthConfig::Basic { username, password } => {
                if username.trim().is_empty() {
                    return Err(ConfigError::EmptyUsername);
                }
                Credential::basic(username, password)
            }
        };

        debug!(authorization = %credential.masked(), "Derived authorization header");
        Ok(credential)
    }
}
