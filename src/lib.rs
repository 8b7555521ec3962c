//! # Bulk Publish
//!
//! Batch provisioning of API definitions through a publisher REST API.
//! Every generated resource is driven through the same lifecycle:
//!
//! 1. **create** the API definition
//! 2. create a **revision** of it
//! 3. **deploy** that revision to a gateway environment
//! 4. **publish** it by changing its lifecycle state
//!
//! Resources are processed one at a time, in order. A failing step ends that
//! resource's pipeline and is recorded with the step it failed at; the batch
//! moves on to the next resource and reports all failures at the end.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulk_publish::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = ProvisionConfig::new(
//!         "https://localhost:9443/api/am/publisher/v4",
//!         AuthConfig::basic("admin", "admin"),
//!     );
//!     config.batch.prefix = "pro".to_string();
//!     config.batch.start = 2;
//!     config.batch.count = 5;
//!
//!     let report = run_provisioning(config).await?;
//!     println!("{}", report.render());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod engine;

// Re-export main types
pub use client::{
    ClientError, Credential, CredentialProvider, LifecycleApi, PayloadBuilder, PublisherClient,
    RemoteCallError,
};
pub use config::{AuthConfig, ConfigError, LoadError, PayloadConfig, ProvisionConfig};
pub use engine::{
    run_provisioning, BatchDriver, BatchObserver, BatchReport, BatchRun, FailureRecord,
    LifecycleOrchestrator, NameSequence, OverallStatus, PipelineOutcome, Progress,
    ProvisionError, Provisioner, ReportAggregator, StepName, StepResult,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{Credential, CredentialProvider, LifecycleApi, PublisherClient};
    pub use crate::config::{AuthConfig, BatchConfig, PayloadConfig, ProvisionConfig};
    pub use crate::engine::{
        progress_line, run_provisioning, summarize, BatchDriver, BatchObserver, BatchReport,
        LifecycleOrchestrator, NameSequence, NoopObserver, PipelineOutcome, Progress,
        ProvisionError, Provisioner, StepName, StepResult,
    };
}
