#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use bulk_publish::prelude::*;
use bulk_publish::{PipelineOutcome, RemoteCallError};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const API_BASE_PATH: &str = "/api/am/publisher/v4";

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

pub fn credential() -> Credential {
    Credential::bearer("test-token")
}

/// One call seen by [`ScriptedApi`], keyed by resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub step: StepName,
    pub resource: String,
}

/// In-memory publisher: ids are `id-<name>` and `rev-<name>`, and any
/// (resource, step) pair can be told to fail.
#[derive(Default)]
pub struct ScriptedApi {
    failures: HashSet<(String, StepName)>,
    calls: Mutex<Vec<Call>>,
    target_states: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, resource: &str, step: StepName) -> Self {
        self.failures.insert((resource.to_string(), step));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, resource: &str) -> Vec<StepName> {
        self.calls()
            .into_iter()
            .filter(|c| c.resource == resource)
            .map(|c| c.step)
            .collect()
    }

    pub fn target_states(&self) -> Vec<String> {
        self.target_states.lock().unwrap().clone()
    }

    fn respond(&self, step: StepName, resource: &str, produced_id: Option<String>) -> StepResult {
        self.calls.lock().unwrap().push(Call {
            step,
            resource: resource.to_string(),
        });

        if self.failures.contains(&(resource.to_string(), step)) {
            return StepResult::failure(
                step,
                &RemoteCallError::Status {
                    status: 500,
                    body: format!("{{\"message\":\"{} failed for {}\"}}", step, resource),
                },
            );
        }
        StepResult::success(step, produced_id)
    }
}

fn resource_of(resource_id: &str) -> &str {
    resource_id.strip_prefix("id-").unwrap_or(resource_id)
}

#[async_trait]
impl LifecycleApi for ScriptedApi {
    async fn create_resource(&self, name: &str, _credential: &Credential) -> StepResult {
        self.respond(StepName::Create, name, Some(format!("id-{}", name)))
    }

    async fn create_revision(&self, resource_id: &str, _credential: &Credential) -> StepResult {
        let name = resource_of(resource_id);
        self.respond(StepName::Revision, name, Some(format!("rev-{}", name)))
    }

    async fn deploy_revision(
        &self,
        resource_id: &str,
        _revision_id: &str,
        _credential: &Credential,
    ) -> StepResult {
        self.respond(StepName::Deploy, resource_of(resource_id), None)
    }

    async fn transition_lifecycle_state(
        &self,
        resource_id: &str,
        target_state: &str,
        _credential: &Credential,
    ) -> StepResult {
        self.target_states
            .lock()
            .unwrap()
            .push(target_state.to_string());
        self.respond(StepName::Publish, resource_of(resource_id), None)
    }
}

/// Observer that keeps everything it is told
#[derive(Default)]
pub struct RecordingObserver {
    pub started_with: Option<u64>,
    pub seen: Vec<(Progress, PipelineOutcome)>,
    pub skipped: Vec<String>,
}

impl BatchObserver for RecordingObserver {
    fn on_start(&mut self, total: u64) {
        self.started_with = Some(total);
    }

    fn on_outcome(&mut self, progress: Progress, outcome: &PipelineOutcome) {
        self.seen.push((progress, outcome.clone()));
    }

    fn on_stopped(&mut self, skipped: &[String]) {
        self.skipped.extend_from_slice(skipped);
    }
}

// ============================================================================
// Stub publisher HTTP server
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub target: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or_default()
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers.get_all(name).iter().count()
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct StubState {
    handler: Handler,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            handler: Arc::new(handler),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(record_and_respond).with_state(state);

        Self {
            base_url: serve(app).await,
            requests,
        }
    }

    /// Publisher that accepts every call
    pub async fn publisher() -> Self {
        Self::start(publisher_handler).await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Stub server has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}{}", addr, API_BASE_PATH)
}

async fn record_and_respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let request = RecordedRequest {
        method: method.to_string(),
        target: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        headers,
        body,
    };
    let (status, body) = (state.handler)(&request);
    state.requests.lock().unwrap().push(request);

    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// Accepts requests and answers only after a minute
pub async fn silent_server() -> String {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        StatusCode::GATEWAY_TIMEOUT
    });
    serve(app).await
}

/// Address nothing listens on
pub async fn closed_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, API_BASE_PATH)
}

/// Happy-path publisher behaviour: ids derived from the API name
pub fn publisher_handler(request: &RecordedRequest) -> (u16, String) {
    let path = request.path();
    let apis = format!("{}/apis", API_BASE_PATH);

    if path == apis {
        let name = request.json()["name"].as_str().unwrap_or("unknown").to_string();
        return (201, json!({ "id": format!("id-{}", name), "name": name }).to_string());
    }
    if path == format!("{}/change-lifecycle", apis) {
        return (
            200,
            json!({ "workflowStatus": null, "lifecycleState": { "state": "Published" } })
                .to_string(),
        );
    }
    if let Some(rest) = path.strip_prefix(&format!("{}/", apis)) {
        if let Some(id) = rest.strip_suffix("/revisions") {
            let name = id.strip_prefix("id-").unwrap_or(id);
            return (201, json!({ "id": format!("rev-{}", name) }).to_string());
        }
        if rest.ends_with("/deploy-revision") {
            return (201, json!([{ "name": "Default", "vhost": "localhost" }]).to_string());
        }
    }
    (404, json!({ "message": "no such route" }).to_string())
}
