//! Aggregated outcome of a delivery run.

use serde::Serialize;

/// Counters and project lists of one run.
///
/// After a completed run `successful + failed + skipped == filtered_projects`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub total_projects: usize,
    pub filtered_projects: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failed_projects: Vec<String>,
    pub skipped_projects: Vec<String>,
}

impl DeliveryResult {
    pub fn new(total_projects: usize, filtered_projects: usize) -> Self {
        Self {
            total_projects,
            filtered_projects,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, name: impl Into<String>) {
        self.failed += 1;
        self.failed_projects.push(name.into());
    }

    pub fn record_skip(&mut self, name: impl Into<String>) {
        self.skipped += 1;
        self.skipped_projects.push(name.into());
    }

    /// Projects that ended as successful, failed or skipped.
    pub fn accounted(&self) -> usize {
        self.successful + self.failed + self.skipped
    }

    /// True when no push failed. Skips do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
