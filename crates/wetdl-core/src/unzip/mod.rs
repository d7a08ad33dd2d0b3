//! Decompression stage: turns the fetch output's `.gz` segments into plain files.
//!
//! Runs independently of the fetch core and shares no state with it; it only
//! reads the files a fetch run left behind. Already-decompressed files are
//! skipped, so reruns pick up where a previous pass stopped.

mod decode;
mod scan;

pub use decode::{decompress_file, output_path_for, UnzipOutcome};
pub use scan::find_gz_files;

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Tally of one unzip pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnzipSummary {
    pub found: u64,
    pub extracted: u64,
    pub skipped: u64,
    pub failed: u64,
    pub bytes_written: u64,
}

impl UnzipSummary {
    fn record(&mut self, gz_path: &Path, outcome: &UnzipOutcome) {
        match outcome {
            UnzipOutcome::Extracted { output, bytes } => {
                self.extracted += 1;
                self.bytes_written += bytes;
                tracing::info!(bytes, "extracted: {}", output.display());
            }
            UnzipOutcome::Skipped { output } => {
                self.skipped += 1;
                tracing::info!("skipping (already extracted): {}", output.display());
            }
            UnzipOutcome::Failed { error } => {
                self.failed += 1;
                tracing::warn!("error extracting {}: {:#}", gz_path.display(), error);
            }
        }
    }
}

impl fmt::Display for UnzipSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .gz file(s): {} extracted ({} bytes), {} skipped, {} failed",
            self.found, self.extracted, self.bytes_written, self.skipped, self.failed
        )
    }
}

/// Decompresses every `.gz` under `input_root` into `output_root`, at most
/// `max_concurrent` files at a time on the blocking pool.
///
/// Errors only if the input root is missing or the output root cannot be created.
pub async fn run_unzip(
    input_root: &Path,
    output_root: &Path,
    max_concurrent: usize,
    cancel: CancellationToken,
) -> Result<UnzipSummary> {
    if !input_root.is_dir() {
        anyhow::bail!("input directory {} does not exist", input_root.display());
    }
    tokio::fs::create_dir_all(output_root)
        .await
        .with_context(|| format!("create output directory {}", output_root.display()))?;

    let files = tokio::task::spawn_blocking({
        let root = input_root.to_path_buf();
        move || find_gz_files(&root)
    })
    .await
    .context("scan task join")?;

    let mut summary = UnzipSummary {
        found: files.len() as u64,
        ..UnzipSummary::default()
    };
    if files.is_empty() {
        tracing::warn!("no .gz files found in {}", input_root.display());
        return Ok(summary);
    }
    tracing::info!("found {} .gz file(s); starting extraction", files.len());

    let slots = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut join_set = JoinSet::new();
    for (seq, gz_path) in (0u64..).zip(files) {
        let permit = tokio::select! {
            permit = Arc::clone(&slots).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
            _ = cancel.cancelled() => break,
        };
        let output_root = output_root.to_path_buf();
        join_set.spawn_blocking(move || {
            let _permit = permit;
            let outcome = decompress_file(&gz_path, &output_root, seq);
            (gz_path, outcome)
        });
    }

    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((gz_path, outcome)) => summary.record(&gz_path, &outcome),
            Err(e) => {
                summary.failed += 1;
                tracing::warn!("unzip task did not finish: {}", e);
            }
        }
    }

    tracing::info!("unzip finished: {}", summary);
    Ok(summary)
}
