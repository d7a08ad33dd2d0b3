//! Aggregate tally of one run's outcomes.

use std::fmt;

use crate::downloader::{SkipReason, TransferOutcome};

/// Counts per outcome kind plus byte totals. Logged once when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks that reached a terminal state.
    pub tasks: u64,
    pub downloaded: u64,
    pub bytes_downloaded: u64,
    pub skipped_exists: u64,
    pub skipped_budget: u64,
    pub skipped_no_length: u64,
    pub failed: u64,
    /// Budget total at the end of the run (committed bytes, plus failed
    /// reservations under the retain policy).
    pub reserved_total: u64,
    pub cap: u64,
}

impl RunSummary {
    pub fn new(cap: u64) -> Self {
        Self {
            cap,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &TransferOutcome) {
        self.tasks += 1;
        match outcome {
            TransferOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes_downloaded += bytes;
            }
            TransferOutcome::Skipped(SkipReason::AlreadyExists) => self.skipped_exists += 1,
            TransferOutcome::Skipped(SkipReason::BudgetExhausted) => self.skipped_budget += 1,
            TransferOutcome::Skipped(SkipReason::NoContentLength) => self.skipped_no_length += 1,
            TransferOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn skipped(&self) -> u64 {
        self.skipped_exists + self.skipped_budget + self.skipped_no_length
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} task(s): {} downloaded ({} bytes), {} skipped ({} existing, {} over budget, {} without length), {} failed; budget {} / {} bytes",
            self.tasks,
            self.downloaded,
            self.bytes_downloaded,
            self.skipped(),
            self.skipped_exists,
            self.skipped_budget,
            self.skipped_no_length,
            self.failed,
            self.reserved_total,
            self.cap,
        )
    }
}
