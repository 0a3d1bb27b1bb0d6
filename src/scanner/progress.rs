//! Progress snapshots emitted while a scan runs.

use super::traits::PortStatus;
use serde::Serialize;
use std::sync::Arc;

/// Callback receiving progress snapshots.
pub type ProgressSink = Arc<dyn Fn(ScanProgress) + Send + Sync>;

/// Point-in-time summary of a running scan.
///
/// Each snapshot replaces the previous one; nothing needs to be merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    /// Work items finished so far.
    pub completed: u64,
    /// Total work items in the scan.
    pub total: u64,
    /// Open and open|filtered results.
    pub open: u64,
    /// Closed results.
    pub closed: u64,
    /// Filtered results.
    pub filtered: u64,
}

impl ScanProgress {
    /// Start an empty tally for a scan of `total` items.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Completion percentage, 0 when there is nothing to do.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    /// Count one finished probe.
    ///
    /// Errors count toward `completed` only.
    pub fn record(&mut self, status: PortStatus) {
        self.completed += 1;
        match status {
            PortStatus::Open | PortStatus::OpenFiltered => self.open += 1,
            PortStatus::Closed => self.closed += 1,
            PortStatus::Filtered => self.filtered += 1,
            PortStatus::Error => {}
        }
    }

    /// Errors and other unclassified completions.
    pub fn errors(&self) -> u64 {
        self.completed - self.open - self.closed - self.filtered
    }

    /// Check if every work item has completed.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    /// Whether a snapshot should be published after the latest completion.
    ///
    /// Every tenth completion, and always the final one.
    pub fn should_emit(&self) -> bool {
        self.completed % 10 == 0 || self.completed == self.total
    }
}
