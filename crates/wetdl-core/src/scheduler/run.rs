//! Orchestrator: manifest keys in, one transfer task per key, summary out.
//!
//! Keys are launched in manifest order with a fixed delay between launches and at
//! most `max_concurrent` transfers in flight. Completion order is unconstrained.
//! The run ends when the manifest is exhausted (or shutdown is requested) and
//! every launched transfer has reached a terminal state.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::config::WetdlConfig;
use crate::downloader::{
    self, CurlOptions, Task, TransferContext, TransferError, TransferOutcome,
};
use crate::manifest::{ManifestError, ManifestReader};

use super::budget::ByteBudget;
use super::progress::spawn_progress_reporter;
use super::summary::RunSummary;

/// Per-run settings for the orchestrator, resolved from `WetdlConfig`.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub base_url: url::Url,
    pub output_dir: PathBuf,
    /// Pause after each launch.
    pub launch_delay: Duration,
    /// Ceiling on in-flight transfers (0 = none).
    pub max_concurrent: usize,
    pub curl: CurlOptions,
}

impl BatchSettings {
    pub fn from_config(cfg: &WetdlConfig) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url()?,
            output_dir: cfg.output_dir.clone(),
            launch_delay: cfg.launch_delay(),
            max_concurrent: cfg.max_concurrent_transfers,
            curl: CurlOptions {
                connect_timeout: cfg.connect_timeout(),
            },
        })
    }
}

fn joined_outcome(res: Result<TransferOutcome, JoinError>) -> TransferOutcome {
    res.unwrap_or_else(|e| {
        tracing::warn!("transfer task did not finish: {}", e);
        TransferOutcome::Failed(TransferError::Worker(e.to_string()))
    })
}

/// Launches one transfer per key and waits for all of them.
///
/// A manifest read error stops further launches; transfers already running still
/// finish. Cancelling `cancel` stops launching immediately and aborts in-flight
/// transfers (they discard their temp files).
pub async fn run_batch<I>(
    keys: I,
    settings: &BatchSettings,
    budget: Arc<ByteBudget>,
    cancel: CancellationToken,
) -> RunSummary
where
    I: IntoIterator<Item = Result<String, ManifestError>>,
{
    let slots = (settings.max_concurrent > 0)
        .then(|| Arc::new(Semaphore::new(settings.max_concurrent)));
    let ctx = TransferContext {
        budget: Arc::clone(&budget),
        curl: settings.curl,
        cancel: cancel.clone(),
    };
    let mut summary = RunSummary::new(budget.cap());
    let mut join_set = JoinSet::new();

    for (seq, item) in (0u64..).zip(keys) {
        if cancel.is_cancelled() {
            break;
        }
        let key = match item {
            Ok(key) => key,
            Err(e) => {
                tracing::error!("{}; no further transfers will be launched", e);
                break;
            }
        };
        let task = match Task::new(seq, &key, &settings.base_url, &settings.output_dir) {
            Ok(task) => task,
            Err(e) => {
                let outcome = TransferOutcome::Failed(e);
                downloader::log_outcome(seq, &key, &outcome);
                summary.record(&outcome);
                continue;
            }
        };

        let permit = match &slots {
            Some(slots) => tokio::select! {
                permit = Arc::clone(slots).acquire_owned() => match permit {
                    Ok(permit) => Some(permit),
                    Err(_) => break,
                },
                _ = cancel.cancelled() => break,
            },
            None => None,
        };

        while let Some(res) = join_set.try_join_next() {
            summary.record(&joined_outcome(res));
        }

        tracing::debug!(seq, key = %task.source_key, url = %task.source_url, "launching transfer");
        let ctx = ctx.clone();
        join_set.spawn(async move {
            let _permit = permit;
            downloader::run_transfer(task, ctx).await
        });

        if !settings.launch_delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(settings.launch_delay) => {}
                _ = cancel.cancelled() => break,
            }
        }
    }

    if cancel.is_cancelled() {
        tracing::info!(
            in_flight = join_set.len(),
            "shutdown requested; waiting for in-flight transfers to stop"
        );
    }
    while let Some(res) = join_set.join_next().await {
        summary.record(&joined_outcome(res));
    }

    summary.reserved_total = budget.reserved();
    summary
}

/// Full fetch run: open the manifest, start the progress reporter, run the batch,
/// stop the reporter, log the summary.
///
/// The only error is a manifest that cannot be opened (or invalid settings); every
/// per-task failure is folded into the returned summary.
pub async fn run_fetch(cfg: &WetdlConfig, cancel: CancellationToken) -> Result<RunSummary> {
    cfg.validate()?;
    let settings = BatchSettings::from_config(cfg)?;
    let manifest = ManifestReader::open(&cfg.manifest_path).context("cannot start fetch")?;

    let budget = Arc::new(ByteBudget::new(cfg.max_total_bytes, cfg.release_policy));
    tracing::info!(
        manifest = %manifest.path().display(),
        output_dir = %settings.output_dir.display(),
        base_url = %settings.base_url,
        cap_bytes = budget.cap(),
        max_concurrent = settings.max_concurrent,
        "starting fetch"
    );

    let reporter_cancel = cancel.child_token();
    let reporter = spawn_progress_reporter(
        Arc::clone(&budget),
        cfg.progress_interval(),
        reporter_cancel.clone(),
    );

    let summary = run_batch(manifest, &settings, budget, cancel).await;

    reporter_cancel.cancel();
    if let Err(e) = reporter.await {
        tracing::warn!("progress reporter: {}", e);
    }
    tracing::info!("fetch finished: {}", summary);
    Ok(summary)
}
