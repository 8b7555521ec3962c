//! Batch driver
//!
//! Generates resource names from a prefix, start index and count, and
//! runs the lifecycle orchestrator for each one, strictly in order. A fixed
//! pause separates consecutive resources (never after the last) to keep the
//! request rate against the publisher down. A stop signal is checked before
//! each resource.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::orchestrator::LifecycleOrchestrator;
use super::result::PipelineOutcome;
use crate::client::{Credential, LifecycleApi};
use crate::config::{BatchConfig, ConfigError};

/// Ordered names `prefix + start`, `prefix + (start + 1)`, ...
///
/// Every index in the range fits in a `u64`, so the sequence always yields
/// exactly `len()` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSequence {
    prefix: String,
    start: u64,
    count: u64,
}

impl NameSequence {
    pub fn new(prefix: impl Into<String>, start: u64, count: u64) -> Result<Self, ConfigError> {
        if count > 0 && start.checked_add(count - 1).is_none() {
            return Err(ConfigError::IndexOverflow { start, count });
        }
        Ok(Self {
            prefix: prefix.into(),
            start,
            count,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.count).map(move |offset| format!("{}{}", self.prefix, self.start + offset))
    }
}

impl TryFrom<&BatchConfig> for NameSequence {
    type Error = ConfigError;

    fn try_from(config: &BatchConfig) -> Result<Self, Self::Error> {
        Self::new(config.prefix.clone(), config.start, config.count)
    }
}

/// Position of a resource within the batch (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub index: u64,
    pub total: u64,
}

/// Receives outcomes as they are produced
pub trait BatchObserver: Send {
    fn on_start(&mut self, _total: u64) {}

    fn on_outcome(&mut self, progress: Progress, outcome: &PipelineOutcome);

    fn on_stopped(&mut self, _skipped: &[String]) {}
}

impl<T: BatchObserver + ?Sized> BatchObserver for &mut T {
    fn on_start(&mut self, total: u64) {
        (**self).on_start(total)
    }

    fn on_outcome(&mut self, progress: Progress, outcome: &PipelineOutcome) {
        (**self).on_outcome(progress, outcome)
    }

    fn on_stopped(&mut self, skipped: &[String]) {
        (**self).on_stopped(skipped)
    }
}

/// Fan out to two observers, first then second
impl<A: BatchObserver, B: BatchObserver> BatchObserver for (A, B) {
    fn on_start(&mut self, total: u64) {
        self.0.on_start(total);
        self.1.on_start(total);
    }

    fn on_outcome(&mut self, progress: Progress, outcome: &PipelineOutcome) {
        self.0.on_outcome(progress, outcome);
        self.1.on_outcome(progress, outcome);
    }

    fn on_stopped(&mut self, skipped: &[String]) {
        self.0.on_stopped(skipped);
        self.1.on_stopped(skipped);
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_outcome(&mut self, _progress: Progress, _outcome: &PipelineOutcome) {}
}

/// Everything a batch run produced
#[derive(Debug, Clone, Default)]
pub struct BatchRun {
    /// One outcome per processed resource, in processing order
    pub outcomes: Vec<PipelineOutcome>,
    /// Names never attempted because the stop signal was raised
    pub skipped: Vec<String>,
}

impl BatchRun {
    pub fn stopped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

pub struct BatchDriver<A> {
    orchestrator: LifecycleOrchestrator<A>,
    pacing: Duration,
    stop: Arc<AtomicBool>,
}

impl<A: LifecycleApi> BatchDriver<A> {
    pub fn new(orchestrator: LifecycleOrchestrator<A>) -> Self {
        Self {
            orchestrator,
            pacing: Duration::from_millis(500),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that stops the batch before its next resource when set
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn orchestrator(&self) -> &LifecycleOrchestrator<A> {
        &self.orchestrator
    }

    pub async fn run_batch(
        &self,
        names: &NameSequence,
        credential: &Credential,
        observer: &mut dyn BatchObserver,
    ) -> BatchRun {
        let total = names.len();
        let mut run = BatchRun::default();
        observer.on_start(total);

        info!(
            prefix = %names.prefix,
            start = names.start,
            count = total,
            "Starting batch"
        );

        let mut pending = names.names().peekable();
        let mut index = 0;
        while let Some(name) = pending.next() {
            if self.stop.load(Ordering::SeqCst) {
                run.skipped.push(name);
                run.skipped.extend(pending);
                warn!(skipped = run.skipped.len(), "Batch stopped before completion");
                observer.on_stopped(&run.skipped);
                break;
            }

            index += 1;
            let outcome = self.orchestrator.run(&name, credential).await;
            observer.on_outcome(Progress { index, total }, &outcome);
            run.outcomes.push(outcome);

            if pending.peek().is_some() && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        run
    }
}
