//! Batch report aggregation and rendering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::batch::{BatchObserver, Progress};
use super::result::{PipelineOutcome, StepName};

/// Longest error detail shown on the console before truncation
pub const DISPLAY_DETAIL_LIMIT: usize = 100;

const RULE: &str = "============================================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub resource_name: String,
    pub failing_step: StepName,
    pub error_detail: String,
}

/// Summary of a whole batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// In processing order, error detail never truncated
    pub failures: Vec<FailureRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Console summary block
    pub fn render(&self) -> String {
        let mut lines = vec![
            RULE.to_string(),
            if self.is_complete() {
                "Batch completed".to_string()
            } else {
                "Batch stopped early".to_string()
            },
            format!("Run ID: {}", self.run_id),
            format!("Total resources: {}", self.total),
            format!("Successfully published: {}", self.succeeded),
            format!("Failed: {}", self.failed),
        ];

        if !self.skipped.is_empty() {
            lines.push(format!("Not attempted: {}", self.skipped.len()));
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed resources:".to_string());
            for failure in &self.failures {
                lines.push(format!(
                    "  - {} (Failed at: {})",
                    failure.resource_name, failure.failing_step
                ));
                lines.push(format!(
                    "    Error: {}",
                    display_detail(&failure.error_detail, DISPLAY_DETAIL_LIMIT)
                ));
            }
        }

        lines.push(RULE.to_string());
        lines.join("\n")
    }
}

/// Shorten `detail` to `limit` characters, marking the cut with `...`
pub fn display_detail(detail: &str, limit: usize) -> String {
    if detail.chars().count() > limit {
        let mut shortened: String = detail.chars().take(limit).collect();
        shortened.push_str("...");
        shortened
    } else {
        detail.to_string()
    }
}

/// Console line for one finished resource
pub fn progress_line(progress: Progress, outcome: &PipelineOutcome) -> String {
    let prefix = format!("{}/{}", progress.index, progress.total);
    if outcome.is_success() {
        format!(
            "{} - ✅ Published: {} (ID: {})",
            prefix,
            outcome.resource_name(),
            outcome.resource_id().unwrap_or("N/A")
        )
    } else {
        format!(
            "{} - ❌ Failed: {} (Step: {})\n   Error: {}",
            prefix,
            outcome.resource_name(),
            outcome
                .failing_step()
                .map(|s| s.as_str())
                .unwrap_or("unknown"),
            outcome.error_detail().unwrap_or("Unknown error")
        )
    }
}

/// Incremental fold of outcomes into a [`BatchReport`]
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    run_id: String,
    started_at: DateTime<Utc>,
    succeeded: u64,
    failed: u64,
    failures: Vec<FailureRecord>,
    skipped: Vec<String>,
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record(&mut self, outcome: &PipelineOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
            return;
        }

        self.failed += 1;
        if let Some(failing_step) = outcome.failing_step() {
            self.failures.push(FailureRecord {
                resource_name: outcome.resource_name().to_string(),
                failing_step,
                error_detail: outcome.error_detail().unwrap_or("Unknown error").to_string(),
            });
        }
    }

    pub fn record_skipped(&mut self, skipped: &[String]) {
        self.skipped.extend_from_slice(skipped);
    }

    pub fn finish(self) -> BatchReport {
        BatchReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            total: self.succeeded + self.failed,
            succeeded: self.succeeded,
            failed: self.failed,
            failures: self.failures,
            skipped: self.skipped,
        }
    }
}

impl BatchObserver for ReportAggregator {
    fn on_outcome(&mut self, _progress: Progress, outcome: &PipelineOutcome) {
        self.record(outcome);
    }

    fn on_stopped(&mut self, skipped: &[String]) {
        self.record_skipped(skipped);
    }
}

/// Fold a complete outcome sequence into a report
pub fn summarize<'a>(outcomes: impl IntoIterator<Item = &'a PipelineOutcome>) -> BatchReport {
    let mut aggregator = ReportAggregator::new();
    for outcome in outcomes {
        aggregator.record(outcome);
    }
    aggregator.finish()
}
