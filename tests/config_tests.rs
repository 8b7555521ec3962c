//! Loading provisioning configuration from YAML files

mod common;

use bulk_publish::client::payload::builder_from_config;
use bulk_publish::prelude::*;
use bulk_publish::{ConfigError, LoadError, PayloadBuilder};
use common::{create_test_dir, write_file};

#[test]
fn test_load_full_config() {
    let dir = create_test_dir();
    let path = write_file(
        dir.path(),
        "provision.yml",
        r#"
base_url: https://localhost:9443/api/am/publisher/v4
timeout: 10000
validate_ssl: false
headers:
  X-Tenant: carbon.super

auth:
  type: basic
  username: admin
  password: admin

batch:
  prefix: pro
  start: 2
  count: 5
  pacing_ms: 250

lifecycle:
  target_state: Deploy as a Prototype
  revision_description: First cut
  deployment:
    name: Staging
    vhost: gw.example.com
    display_on_devportal: false

payload:
  type: detailed
  provider: admin
  tags: [billing]
"#,
    );

    let config = ProvisionConfig::load(&path).unwrap();

    assert_eq!(config.base_url, "https://localhost:9443/api/am/publisher/v4");
    assert_eq!(config.timeout, 10000);
    assert!(!config.validate_ssl);
    assert_eq!(config.headers.get("X-Tenant").map(String::as_str), Some("carbon.super"));
    assert_eq!(config.auth, Some(AuthConfig::basic("admin", "admin")));
    assert_eq!(config.batch.prefix, "pro");
    assert_eq!(config.batch.start, 2);
    assert_eq!(config.batch.count, 5);
    assert_eq!(config.batch.pacing_ms, 250);
    assert_eq!(config.lifecycle.target_state, "Deploy as a Prototype");
    assert_eq!(config.lifecycle.revision_description, "First cut");
    assert_eq!(config.lifecycle.deployment.name, "Staging");
    assert!(!config.lifecycle.deployment.display_on_devportal);
    assert!(matches!(config.payload, PayloadConfig::Detailed(_)));
    assert!(config.validate().is_ok());
}

#[test]
fn test_defaults_for_minimal_file() {
    let dir = create_test_dir();
    let path = write_file(
        dir.path(),
        "provision.yml",
        r#"
base_url: http://localhost:9763/api/am/publisher/v4
auth:
  type: bearer
  token: abc
"#,
    );

    let config = ProvisionConfig::load(&path).unwrap();

    assert_eq!(config.timeout, 30000);
    assert!(config.validate_ssl);
    assert_eq!(config.batch, BatchConfig::default());
    assert_eq!(config.batch.pacing_ms, 500);
    assert_eq!(config.lifecycle.target_state, "Publish");
    assert_eq!(config.lifecycle.deployment.vhost, "localhost");
    assert_eq!(config.payload, PayloadConfig::default());
}

#[test]
fn test_invalid_yaml_names_file() {
    let dir = create_test_dir();
    let path = write_file(dir.path(), "broken.yml", "base_url: [unclosed\n");

    let error = ProvisionConfig::load(&path).unwrap_err();

    assert!(matches!(error, LoadError::Yaml { .. }));
    assert!(error.to_string().contains("broken.yml"));
}

#[test]
fn test_missing_file() {
    let dir = create_test_dir();
    let error = ProvisionConfig::load(dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(error, LoadError::Io(_)));
}

#[test]
fn test_placeholder_token_in_file_fails_validation() {
    let dir = create_test_dir();
    let path = write_file(
        dir.path(),
        "provision.yml",
        r#"
base_url: https://localhost:9443/api/am/publisher/v4
auth:
  type: bearer
  token: "<access-token>"
"#,
    );

    let config = ProvisionConfig::load(&path).unwrap();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::PlaceholderToken(_))
    ));
}

#[test]
fn test_template_payload_from_config() {
    let dir = create_test_dir();
    let template = write_file(
        dir.path(),
        "api.json.hbs",
        r#"{ "name": "{{name}}", "context": "/shop/{{context}}", "version": "1.0.0", "tags": ["bulk"] }"#,
    );
    let path = write_file(
        dir.path(),
        "provision.yml",
        &format!(
            "base_url: https://localhost:9443/api/am/publisher/v4\npayload:\n  type: template\n  path: {}\n",
            template.display()
        ),
    );

    let config = ProvisionConfig::load(&path).unwrap();
    let builder = builder_from_config(&config.payload).unwrap();
    let document = builder.resource_definition("cart3").unwrap();

    assert_eq!(document["name"], "cart3");
    assert_eq!(document["context"], "/shop/cart3");
    assert_eq!(document["tags"][0], "bulk");
}

#[test]
fn test_missing_template_file_fails_client_startup() {
    let dir = create_test_dir();
    let mut config = ProvisionConfig::new(
        "https://localhost:9443/api/am/publisher/v4",
        AuthConfig::bearer("abc"),
    );
    config.payload = PayloadConfig::Template {
        path: dir.path().join("missing.hbs"),
    };

    let result = Provisioner::from_config(config);

    assert!(matches!(result, Err(ProvisionError::Client(_))));
}
