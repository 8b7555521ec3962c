//! Batch provisioning engine
//!
//! This module contains:
//! - `result` - Step and per-resource outcome types
//! - `orchestrator` - Drives one resource through its lifecycle
//! - `batch` - Name generation, pacing and sequential dispatch
//! - `report` - Outcome aggregation and console rendering
//! - `provisioner` - Validated top-level entry point
//! - `error` - Fatal error types

pub mod batch;
pub mod error;
pub mod orchestrator;
pub mod provisioner;
pub mod report;
pub mod result;

pub use batch::{BatchDriver, BatchObserver, BatchRun, NameSequence, NoopObserver, Progress};
pub use error::ProvisionError;
pub use orchestrator::{LifecycleOrchestrator, PipelineState};
pub use provisioner::{run_provisioning, Provisioner};
pub use report::{display_detail, progress_line, summarize, BatchReport, FailureRecord, ReportAggregator};
pub use result::{OverallStatus, PipelineOutcome, StepName, StepOutcome, StepResult};
