//! Per-resource lifecycle orchestration
//!
//! Drives one resource through `Pending → Created → Revisioned → Deployed →
//! Published`. The first failing step moves the pipeline to `Failed` and no
//! later step is attempted; steps that already completed are not rolled back.

use tracing::{debug, info, warn};

use super::result::{PipelineOutcome, StepName, StepResult};
use crate::client::{Credential, LifecycleApi};

/// Where a resource is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Created {
        resource_id: String,
    },
    Revisioned {
        resource_id: String,
        revision_id: String,
    },
    Deployed {
        resource_id: String,
        revision_id: String,
    },
    Published {
        resource_id: String,
        revision_id: String,
    },
    Failed {
        at: StepName,
        detail: String,
        resource_id: Option<String>,
        revision_id: Option<String>,
    },
}

impl PipelineState {
    /// The step that moves this state forward, if any
    pub fn next_step(&self) -> Option<StepName> {
        match self {
            PipelineState::Pending => Some(StepName::Create),
            PipelineState::Created { .. } => Some(StepName::Revision),
            PipelineState::Revisioned { .. } => Some(StepName::Deploy),
            PipelineState::Deployed { .. } => Some(StepName::Publish),
            PipelineState::Published { .. } | PipelineState::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_step().is_none()
    }

    /// The outcome of a terminal state
    pub fn outcome(&self, resource_name: &str) -> Option<PipelineOutcome> {
        match self {
            PipelineState::Published {
                resource_id,
                revision_id,
            } => Some(PipelineOutcome::published(
                resource_name,
                resource_id.as_str(),
                revision_id.as_str(),
            )),
            PipelineState::Failed {
                at,
                detail,
                resource_id,
                revision_id,
            } => Some(PipelineOutcome::failed(
                resource_name,
                *at,
                detail.as_str(),
                resource_id.clone(),
                revision_id.clone(),
            )),
            _ => None,
        }
    }
}

/// Identifier produced by a successful step
fn produced(result: StepResult) -> Result<String, String> {
    if !result.is_success() {
        return Err(failure_detail(result));
    }
    let step = result.step;
    result
        .produced_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| format!("{} step reported success without an identifier", step))
}

fn completed(result: StepResult) -> Result<(), String> {
    if result.is_success() {
        Ok(())
    } else {
        Err(failure_detail(result))
    }
}

fn failure_detail(result: StepResult) -> String {
    result
        .error_detail
        .unwrap_or_else(|| "Unknown error".to_string())
}

pub struct LifecycleOrchestrator<A> {
    api: A,
    target_state: String,
}

impl<A: LifecycleApi> LifecycleOrchestrator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            target_state: "Publish".to_string(),
        }
    }

    /// Lifecycle action used by the final step
    pub fn with_target_state(mut self, target_state: impl Into<String>) -> Self {
        self.target_state = target_state.into();
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run every step for one resource. Never fails: remote errors end up in
    /// the returned outcome.
    #[tracing::instrument(skip(self, credential))]
    pub async fn run(&self, resource_name: &str, credential: &Credential) -> PipelineOutcome {
        let mut state = PipelineState::Pending;
        loop {
            if let Some(outcome) = state.outcome(resource_name) {
                match &state {
                    PipelineState::Failed { at, detail, .. } => {
                        warn!(step = %at, error = %detail, "Lifecycle step failed")
                    }
                    _ => info!(
                        resource_id = outcome.resource_id().unwrap_or_default(),
                        "Resource published"
                    ),
                }
                return outcome;
            }
            state = self.advance(state, resource_name, credential).await;
        }
    }

    /// Attempt the next step from `state`
    pub async fn advance(
        &self,
        state: PipelineState,
        resource_name: &str,
        credential: &Credential,
    ) -> PipelineState {
        if let Some(step) = state.next_step() {
            debug!(step = %step, "Attempting lifecycle step");
        }

        match state {
            PipelineState::Pending => {
                let result = self.api.create_resource(resource_name, credential).await;
                match produced(result) {
                    Ok(resource_id) => PipelineState::Created { resource_id },
                    Err(detail) => PipelineState::Failed {
                        at: StepName::Create,
                        detail,
                        resource_id: None,
                        revision_id: None,
                    },
                }
            }
            PipelineState::Created { resource_id } => {
                let result = self.api.create_revision(&resource_id, credential).await;
                match produced(result) {
                    Ok(revision_id) => PipelineState::Revisioned {
                        resource_id,
                        revision_id,
                    },
                    Err(detail) => PipelineState::Failed {
                        at: StepName::Revision,
                        detail,
                        resource_id: Some(resource_id),
                        revision_id: None,
                    },
                }
            }
            PipelineState::Revisioned {
                resource_id,
                revision_id,
            } => {
                let result = self
                    .api
                    .deploy_revision(&resource_id, &revision_id, credential)
                    .await;
                match completed(result) {
                    Ok(()) => PipelineState::Deployed {
                        resource_id,
                        revision_id,
                    },
                    Err(detail) => PipelineState::Failed {
                        at: StepName::Deploy,
                        detail,
                        resource_id: Some(resource_id),
                        revision_id: Some(revision_id),
                    },
                }
            }
            PipelineState::Deployed {
                resource_id,
                revision_id,
            } => {
                let result = self
                    .api
                    .transition_lifecycle_state(&resource_id, &self.target_state, credential)
                    .await;
                match completed(result) {
                    Ok(()) => PipelineState::Published {
                        resource_id,
                        revision_id,
                    },
                    Err(detail) => PipelineState::Failed {
                        at: StepName::Publish,
                        detail,
                        resource_id: Some(resource_id),
                        revision_id: Some(revision_id),
                    },
                }
            }
            terminal => terminal,
        }
    }
}
