//! Single-object transfer: existence skip, budget gate, durable write.
//!
//! Each task runs the state machine
//! `CheckExists → FetchHeaders → (budget gate) → Stream → Success | Abort`.
//! The blocking libcurl transfer runs on tokio's blocking pool; the task emits
//! exactly one log line for its terminal state.

mod fetch;
mod handler;
mod outcome;

pub use outcome::{FailureKind, SkipReason, TransferError, TransferOutcome};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::scheduler::ByteBudget;
use crate::url_model;

/// libcurl knobs that are configurable per run.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// One manifest key bound to its source URL and local destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 0-based launch index within the run.
    pub seq: u64,
    pub source_key: String,
    pub source_url: url::Url,
    pub destination: PathBuf,
}

impl Task {
    /// Builds the task for `key`. Fails with `InvalidKey` when the key has no usable
    /// file name or does not resolve against `base_url`.
    pub fn new(
        seq: u64,
        key: &str,
        base_url: &url::Url,
        output_root: &Path,
    ) -> Result<Self, TransferError> {
        let invalid = || TransferError::InvalidKey(key.to_string());
        if key.is_empty() {
            return Err(invalid());
        }
        let destination = url_model::destination_path(output_root, key).ok_or_else(invalid)?;
        let source_url = url_model::source_url(base_url, key).map_err(|_| invalid())?;
        Ok(Self {
            seq,
            source_key: key.to_string(),
            source_url,
            destination,
        })
    }
}

/// Shared handles every transfer of a run needs.
#[derive(Debug, Clone)]
pub struct TransferContext {
    pub budget: Arc<ByteBudget>,
    pub curl: CurlOptions,
    pub cancel: CancellationToken,
}

/// Runs one task to its terminal state and logs that state.
pub async fn run_transfer(task: Task, ctx: TransferContext) -> TransferOutcome {
    let outcome = execute(&task, ctx).await;
    log_outcome(task.seq, &task.source_key, &outcome);
    outcome
}

async fn execute(task: &Task, ctx: TransferContext) -> TransferOutcome {
    match tokio::fs::try_exists(&task.destination).await {
        Ok(true) => return TransferOutcome::Skipped(SkipReason::AlreadyExists),
        Ok(false) => {}
        Err(e) => return TransferOutcome::Failed(TransferError::Filesystem(e)),
    }
    if ctx.cancel.is_cancelled() {
        return TransferOutcome::Failed(TransferError::Cancelled);
    }

    let handle = tokio::task::spawn_blocking({
        let task = task.clone();
        move || fetch::fetch_object(&task, ctx.budget, ctx.curl, ctx.cancel)
    });
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => TransferOutcome::Failed(TransferError::Worker(e.to_string())),
    }
}

/// One line per terminal state: `info` for downloads and skips, `warn` for failures.
pub(crate) fn log_outcome(seq: u64, key: &str, outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Downloaded { bytes } => {
            tracing::info!(seq, key, bytes, "downloaded");
        }
        TransferOutcome::Skipped(reason) => {
            tracing::info!(seq, key, "skipped: {}", reason);
        }
        TransferOutcome::Failed(e) => {
            tracing::warn!(seq, key, kind = ?e.kind(), "failed: {}", e);
        }
    }
}
