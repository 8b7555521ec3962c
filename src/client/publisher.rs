//! Publisher REST client
//!
//! Executes the four lifecycle calls with reqwest:
//! - `POST /apis?openAPIVersion=v3` creates the resource
//! - `POST /apis/{id}/revisions` snapshots it
//! - `POST /apis/{id}/deploy-revision?revisionId=...` deploys the snapshot
//! - `POST /apis/change-lifecycle?action=...&apiId=...` moves its lifecycle state
//!
//! Only 200 and 201 count as success. Every other status is a failure,
//! carrying the status code and raw body, with no distinction between
//! client and server errors.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use super::credential::Credential;
use super::payload::{builder_from_config, deployment_document, revision_document, PayloadBuilder};
use super::{ClientError, LifecycleApi, RemoteCallError};
use crate::config::{ConfigError, LifecycleConfig, ProvisionConfig};
use crate::engine::result::{StepName, StepResult};

/// Raw response of one publisher call
#[derive(Debug, Clone)]
pub struct PublisherResponse {
    pub status: u16,
    pub body: String,
    pub elapsed_ms: u64,
}

impl PublisherResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    pub fn into_status_error(self) -> RemoteCallError {
        RemoteCallError::Status {
            status: self.status,
            body: self.body,
        }
    }

    /// Read the server-assigned `id` from a JSON body
    pub fn id(&self) -> Result<String, RemoteCallError> {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|body| body.get("id").and_then(Value::as_str).map(str::to_string))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RemoteCallError::MissingField {
                field: "id".to_string(),
                body: self.body.clone(),
            })
    }
}

pub struct PublisherClient {
    base_url: Url,
    headers: HeaderMap,
    lifecycle: LifecycleConfig,
    payload: Box<dyn PayloadBuilder>,
    client: reqwest::Client,
}

impl std::fmt::Debug for PublisherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherClient")
            .field("base_url", &self.base_url.as_str())
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl PublisherClient {
    pub fn new(config: &ProvisionConfig) -> Result<Self, ClientError> {
        let payload = builder_from_config(&config.payload)?;
        Self::with_payload(config, payload)
    }

    pub fn with_payload(
        config: &ProvisionConfig,
        payload: Box<dyn PayloadBuilder>,
    ) -> Result<Self, ClientError> {
        let mut client_builder = reqwest::Client::builder().timeout(config.request_timeout());

        if !config.validate_ssl {
            warn!(
                base_url = %config.base_url,
                "TLS certificate validation is disabled; only use this against trusted local endpoints"
            );
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| ClientError::StartupFailed(e.to_string()))?;

        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            headers: config.header_map()?,
            lifecycle: config.lifecycle.clone(),
            payload,
            client,
        })
    }

    /// Append `segments` to the base path, percent-encoding each one
    fn build_url(&self, segments: &[&str]) -> Result<Url, RemoteCallError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RemoteCallError::Request(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Configured headers first; the fixed JSON headers and the credential
    /// replace any configured value with the same name.
    fn request_headers(&self, credential: &Credential) -> Result<HeaderMap, RemoteCallError> {
        let mut authorization = HeaderValue::from_str(&credential.header_value()).map_err(|_| {
            RemoteCallError::Request("credential is not a valid header value".to_string())
        })?;
        authorization.set_sensitive(true);

        let mut headers = self.headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }

    async fn post(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
        credential: &Credential,
    ) -> Result<PublisherResponse, RemoteCallError> {
        let url = self.build_url(segments)?;
        let start = Instant::now();

        let mut request = self
            .client
            .post(url.clone())
            .headers(self.request_headers(credential)?);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("POST {} failed: {}", url, e);
            RemoteCallError::Transport(describe_transport_error(&e))
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        debug!("POST {} -> {} ({}ms)", url, status, elapsed_ms);

        Ok(PublisherResponse {
            status,
            body,
            elapsed_ms,
        })
    }

    async fn create_resource_call(
        &self,
        name: &str,
        credential: &Credential,
    ) -> Result<String, RemoteCallError> {
        let document = self
            .payload
            .resource_definition(name)
            .map_err(|e| RemoteCallError::Request(e.to_string()))?;
        let response = self
            .post(&["apis"], &[("openAPIVersion", "v3")], Some(&document), credential)
            .await?;
        expect_id(response)
    }

    async fn create_revision_call(
        &self,
        resource_id: &str,
        credential: &Credential,
    ) -> Result<String, RemoteCallError> {
        let document = revision_document(&self.lifecycle.revision_description);
        let response = self
            .post(
                &["apis", resource_id, "revisions"],
                &[],
                Some(&document),
                credential,
            )
            .await?;
        expect_id(response)
    }

    async fn deploy_revision_call(
        &self,
        resource_id: &str,
        revision_id: &str,
        credential: &Credential,
    ) -> Result<(), RemoteCallError> {
        let document = deployment_document(&self.lifecycle.deployment);
        let response = self
            .post(
                &["apis", resource_id, "deploy-revision"],
                &[("revisionId", revision_id)],
                Some(&document),
                credential,
            )
            .await?;
        expect_success(response)
    }

    async fn change_lifecycle_call(
        &self,
        resource_id: &str,
        target_state: &str,
        credential: &Credential,
    ) -> Result<(), RemoteCallError> {
        let response = self
            .post(
                &["apis", "change-lifecycle"],
                &[("action", target_state), ("apiId", resource_id)],
                None,
                credential,
            )
            .await?;
        expect_success(response)
    }
}

fn expect_success(response: PublisherResponse) -> Result<(), RemoteCallError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(response.into_status_error())
    }
}

fn expect_id(response: PublisherResponse) -> Result<String, RemoteCallError> {
    if response.is_success() {
        response.id()
    } else {
        Err(response.into_status_error())
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timed out: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}

fn step_result(step: StepName, result: Result<Option<String>, RemoteCallError>) -> StepResult {
    match result {
        Ok(produced_id) => StepResult::success(step, produced_id),
        Err(error) => StepResult::failure(step, &error),
    }
}

#[async_trait]
impl LifecycleApi for PublisherClient {
    async fn create_resource(&self, name: &str, credential: &Credential) -> StepResult {
        let result = self.create_resource_call(name, credential).await.map(Some);
        step_result(StepName::Create, result)
    }

    async fn create_revision(&self, resource_id: &str, credential: &Credential) -> StepResult {
        let result = self
            .create_revision_call(resource_id, credential)
            .await
            .map(Some);
        step_result(StepName::Revision, result)
    }

    async fn deploy_revision(
        &self,
        resource_id: &str,
        revision_id: &str,
        credential: &Credential,
    ) -> StepResult {
        let result = self
            .deploy_revision_call(resource_id, revision_id, credential)
            .await
            .map(|_| None);
        step_result(StepName::Deploy, result)
    }

    async fn transition_lifecycle_state(
        &self,
        resource_id: &str,
        target_state: &str,
        credential: &Credential,
    ) -> StepResult {
        let result = self
            .change_lifecycle_call(resource_id, target_state, credential)
            .await
            .map(|_| None);
        step_result(StepName::Publish, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn make_test_config() -> ProvisionConfig {
        ProvisionConfig::new(
            "https://localhost:9443/api/am/publisher/v4",
            AuthConfig::bearer("test-token"),
        )
    }

    fn response(status: u16, body: &str) -> PublisherResponse {
        PublisherResponse {
            status,
            body: body.to_string(),
            elapsed_ms: 5,
        }
    }

    #[test]
    fn test_build_url() {
        let client = PublisherClient::new(&make_test_config()).unwrap();

        assert_eq!(
            client.build_url(&["apis"]).unwrap().as_str(),
            "https://localhost:9443/api/am/publisher/v4/apis"
        );
        assert_eq!(
            client.build_url(&["apis", "1", "revisions"]).unwrap().as_str(),
            "https://localhost:9443/api/am/publisher/v4/apis/1/revisions"
        );
    }

    #[test]
    fn test_build_url_with_trailing_slash() {
        let mut config = make_test_config();
        config.base_url = "https://localhost:9443/api/am/publisher/v4/".to_string();
        let client = PublisherClient::new(&config).unwrap();

        assert_eq!(
            client.build_url(&["apis"]).unwrap().as_str(),
            "https://localhost:9443/api/am/publisher/v4/apis"
        );
    }

    #[test]
    fn test_build_url_escapes_identifiers() {
        let client = PublisherClient::new(&make_test_config()).unwrap();

        assert_eq!(
            client
                .build_url(&["apis", "a/b c?d", "revisions"])
                .unwrap()
                .as_str(),
            "https://localhost:9443/api/am/publisher/v4/apis/a%2Fb%20c%3Fd/revisions"
        );
    }

    #[test]
    fn test_fixed_headers_replace_configured_ones() {
        let mut config = make_test_config();
        config
            .headers
            .insert("Accept".to_string(), "text/plain".to_string());
        config
            .headers
            .insert("authorization".to_string(), "Basic Zm9vOmJhcg==".to_string());
        config
            .headers
            .insert("X-Tenant".to_string(), "carbon.super".to_string());
        let client = PublisherClient::new(&config).unwrap();

        let headers = client
            .request_headers(&Credential::bearer("test-token"))
            .unwrap();

        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[AUTHORIZATION], "Bearer test-token");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers["x-tenant"], "carbon.super");
    }

    #[test]
    fn test_invalid_configured_header_fails_startup() {
        let mut config = make_test_config();
        config
            .headers
            .insert("Bad Header".to_string(), "x".to_string());

        assert!(matches!(
            PublisherClient::new(&config),
            Err(ClientError::Config(ConfigError::InvalidHeader { .. }))
        ));
    }

    #[test]
    fn test_insecure_client_builds() {
        let mut config = make_test_config();
        config.validate_ssl = false;
        assert!(PublisherClient::new(&config).is_ok());
    }

    #[test]
    fn test_only_200_and_201_succeed() {
        assert!(response(200, "").is_success());
        assert!(response(201, "").is_success());
        assert!(!response(202, "").is_success());
        assert!(!response(204, "").is_success());
        assert!(!response(409, "").is_success());
        assert!(!response(500, "").is_success());
    }

    #[test]
    fn test_status_error_keeps_body() {
        let error = response(409, r#"{"code":409,"message":"Conflict"}"#).into_status_error();
        assert_eq!(
            error.to_string(),
            r#"Status 409: {"code":409,"message":"Conflict"}"#
        );
    }

    #[test]
    fn test_id_extraction() {
        assert_eq!(
            response(201, r#"{"id":"01234567-0123-0123-0123-012345678901","name":"pro2"}"#)
                .id()
                .unwrap(),
            "01234567-0123-0123-0123-012345678901"
        );
        assert!(matches!(
            response(201, r#"{"name":"pro2"}"#).id(),
            Err(RemoteCallError::MissingField { .. })
        ));
        assert!(matches!(
            response(201, "not json").id(),
            Err(RemoteCallError::MissingField { .. })
        ));
        assert!(matches!(
            response(201, r#"{"id":""}"#).id(),
            Err(RemoteCallError::MissingField { .. })
        ));
    }

    #[test]
    fn test_expect_id_prefers_status_error() {
        let error = expect_id(response(500, "boom")).unwrap_err();
        assert_eq!(
            error,
            RemoteCallError::Status {
                status: 500,
                body: "boom".to_string()
            }
        );
    }
}
