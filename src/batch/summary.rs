use crate::batch::item::{ItemStatus, JobResult};

/// Counts and ordered results for reporting.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchSummary {
    /// Items produced in this run.
    pub succeeded: usize,
    /// Items whose pipeline failed.
    pub failed: usize,
    /// Items skipped because an artifact already existed.
    pub skipped: usize,
    /// Per-item results in input order.
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    /// Total number of items.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Identities of failed items, in input order, for a targeted retry.
    pub fn failed_identities(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success())
            .map(JobResult::identity)
            .collect()
    }

    /// `true` when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped ({} total)",
            self.succeeded,
            self.failed,
            self.skipped,
            self.total()
        )
    }
}

/// Reduce ordered results to counts. Pure; performs no IO.
pub fn summarize(results: Vec<JobResult>) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for r in &results {
        match r.status() {
            ItemStatus::Succeeded => summary.succeeded += 1,
            ItemStatus::Failed => summary.failed += 1,
            ItemStatus::Skipped => summary.skipped += 1,
            ItemStatus::Pending => {}
        }
    }
    summary.results = results;
    summary
}

#[cfg(test)]
#[path = "../../tests/unit/batch/summary.rs"]
mod tests;
