//! Step and pipeline result types

use serde::{Deserialize, Serialize};

use crate::client::RemoteCallError;

/// Lifecycle steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Create,
    Revision,
    Deploy,
    Publish,
}

impl StepName {
    pub const ALL: [StepName; 4] = [
        StepName::Create,
        StepName::Revision,
        StepName::Deploy,
        StepName::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Create => "create",
            StepName::Revision => "revision",
            StepName::Deploy => "deploy",
            StepName::Publish => "publish",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Success,
    Failure,
}

/// Result of a single remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: StepName,
    pub outcome: StepOutcome,
    pub produced_id: Option<String>,
    pub error_detail: Option<String>,
}

impl StepResult {
    pub fn success(step: StepName, produced_id: Option<String>) -> Self {
        Self {
            step,
            outcome: StepOutcome::Success,
            produced_id,
            error_detail: None,
        }
    }

    pub fn failure(step: StepName, error: &RemoteCallError) -> Self {
        Self {
            step,
            outcome: StepOutcome::Failure,
            produced_id: None,
            error_detail: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == StepOutcome::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Failed,
}

/// Final result for one resource.
///
/// Only constructible through [`PipelineOutcome::published`] and
/// [`PipelineOutcome::failed`]: a success always carries both identifiers and
/// a failure always carries its step and a non-empty detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    resource_name: String,
    status: OverallStatus,
    failing_step: Option<StepName>,
    resource_id: Option<String>,
    revision_id: Option<String>,
    error_detail: Option<String>,
}

impl PipelineOutcome {
    pub fn published(
        resource_name: impl Into<String>,
        resource_id: impl Into<String>,
        revision_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            status: OverallStatus::Success,
            failing_step: None,
            resource_id: Some(resource_id.into()),
            revision_id: Some(revision_id.into()),
            error_detail: None,
        }
    }

    /// Identifiers produced before the failing step are kept so partially
    /// provisioned resources can be found on the server.
    pub fn failed(
        resource_name: impl Into<String>,
        failing_step: StepName,
        error_detail: impl Into<String>,
        resource_id: Option<String>,
        revision_id: Option<String>,
    ) -> Self {
        let mut error_detail = error_detail.into();
        if error_detail.trim().is_empty() {
            error_detail = "Unknown error".to_string();
        }
        Self {
            resource_name: resource_name.into(),
            status: OverallStatus::Failed,
            failing_step: Some(failing_step),
            resource_id,
            revision_id,
            error_detail: Some(error_detail),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn status(&self) -> OverallStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == OverallStatus::Success
    }

    pub fn failing_step(&self) -> Option<StepName> {
        self.failing_step
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn revision_id(&self) -> Option<&str> {
        self.revision_id.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }
}
