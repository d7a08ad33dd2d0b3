//! Periodic progress reporting from the shared byte budget.
//!
//! The reporter only reads the budget; consumers can compute rate =
//! reserved / elapsed_secs and the fraction of the cap used so far.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::budget::ByteBudget;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Snapshot of run-wide progress.
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Bytes reserved or committed against the budget.
    pub reserved_bytes: u64,
    /// Budget cap in bytes.
    pub cap_bytes: u64,
    /// Elapsed time since the run started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    pub fn capture(budget: &ByteBudget, started: Instant) -> Self {
        Self {
            reserved_bytes: budget.reserved(),
            cap_bytes: budget.cap(),
            elapsed_secs: started.elapsed().as_secs_f64(),
        }
    }

    /// Average rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.reserved_bytes as f64 / self.elapsed_secs
    }

    /// Fraction of the cap used, in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.cap_bytes == 0 {
            return 1.0;
        }
        (self.reserved_bytes as f64 / self.cap_bytes as f64).min(1.0)
    }

    pub fn reserved_gib(&self) -> f64 {
        self.reserved_bytes as f64 / GIB
    }

    pub fn cap_gib(&self) -> f64 {
        self.cap_bytes as f64 / GIB
    }
}

/// Spawns the reporter loop: every `interval` it logs the budget's reserved total.
/// It never mutates the budget and runs until `cancel` fires.
pub fn spawn_progress_reporter(
    budget: Arc<ByteBudget>,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let started = Instant::now();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let stats = ProgressStats::capture(&budget, started);
                    tracing::info!(
                        reserved_bytes = stats.reserved_bytes,
                        "total downloaded: {:.2} / {:.2} GiB ({:.1}%)  {:.2} MiB/s",
                        stats.reserved_gib(),
                        stats.cap_gib(),
                        stats.fraction() * 100.0,
                        stats.bytes_per_sec() / 1_048_576.0,
                    );
                }
                _ = cancel.cancelled() => break,
            }
        }
        tracing::debug!("progress reporter stopped");
    })
}
