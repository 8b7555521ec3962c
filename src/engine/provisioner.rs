//! Top-level provisioning run
//!
//! Validates configuration and derives the credential once, up front. A
//! configuration error aborts the run before any remote call is made;
//! everything after that point is recorded per resource.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::info;

use super::batch::{BatchDriver, BatchObserver, NameSequence, NoopObserver};
use super::error::ProvisionError;
use super::orchestrator::LifecycleOrchestrator;
use super::report::{BatchReport, ReportAggregator};
use crate::client::{CredentialProvider, LifecycleApi, PublisherClient};
use crate::config::{ConfigError, ProvisionConfig};

/// Provision every resource described by `config` against the publisher
pub async fn run_provisioning(config: ProvisionConfig) -> Result<BatchReport, ProvisionError> {
    Provisioner::from_config(config)?
        .run(&mut NoopObserver)
        .await
}

pub struct Provisioner<A> {
    config: ProvisionConfig,
    driver: BatchDriver<A>,
}

impl Provisioner<PublisherClient> {
    pub fn from_config(config: ProvisionConfig) -> Result<Self, ProvisionError> {
        config.validate()?;
        let client = PublisherClient::new(&config)?;
        Ok(Self::with_api(config, client))
    }
}

impl<A: LifecycleApi> Provisioner<A> {
    pub fn with_api(config: ProvisionConfig, api: A) -> Self {
        let orchestrator =
            LifecycleOrchestrator::new(api).with_target_state(config.lifecycle.target_state.clone());
        let driver = BatchDriver::new(orchestrator).pacing(config.batch.pacing());
        Self { config, driver }
    }

    pub fn with_stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.driver = self.driver.with_stop_signal(stop);
        self
    }

    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        self.driver.stop_signal()
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        self.driver.orchestrator().api()
    }

    pub fn names(&self) -> Result<NameSequence, ConfigError> {
        NameSequence::try_from(&self.config.batch)
    }

    /// Run the whole batch, streaming outcomes to `observer` as they arrive
    pub async fn run(
        &self,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchReport, ProvisionError> {
        self.config.validate()?;
        let credential = self
            .config
            .auth
            .as_ref()
            .ok_or(ConfigError::MissingCredentials)?
            .obtain()?;

        let names = self.names()?;
        let mut aggregator = ReportAggregator::new();
        info!(
            run_id = aggregator.run_id(),
            base_url = %self.config.base_url,
            scheme = credential.scheme(),
            "Provisioning run started"
        );

        self.driver
            .run_batch(&names, &credential, &mut (&mut aggregator, observer))
            .await;

        let report = aggregator.finish();
        info!(
            run_id = %report.run_id,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Provisioning run finished"
        );
        Ok(report)
    }
}
