//! `wetdl fetch`: download the manifest's objects under the byte budget.

use anyhow::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use wetdl_core::config::{ReleasePolicy, WetdlConfig};
use wetdl_core::{control, scheduler};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct FetchOverrides {
    pub manifest: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub max_bytes: Option<u64>,
    pub jobs: Option<usize>,
    pub launch_delay_ms: Option<u64>,
    pub progress_interval_secs: Option<u64>,
    pub retain_failed_reservations: bool,
}

impl FetchOverrides {
    pub fn apply(self, mut cfg: WetdlConfig) -> WetdlConfig {
        if let Some(v) = self.manifest {
            cfg.manifest_path = v;
        }
        if let Some(v) = self.output_dir {
            cfg.output_dir = v;
        }
        if let Some(v) = self.base_url {
            cfg.base_url = v;
        }
        if let Some(v) = self.max_bytes {
            cfg.max_total_bytes = v;
        }
        if let Some(v) = self.jobs {
            cfg.max_concurrent_transfers = v;
        }
        if let Some(v) = self.launch_delay_ms {
            cfg.launch_delay_ms = v;
        }
        if let Some(v) = self.progress_interval_secs {
            cfg.progress_interval_secs = v;
        }
        if self.retain_failed_reservations {
            cfg.release_policy = ReleasePolicy::Retain;
        }
        cfg
    }
}

pub async fn run_fetch_command(cfg: WetdlConfig) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = control::cancel_on_ctrl_c(cancel.clone());

    let result = scheduler::run_fetch(&cfg, cancel.clone()).await;
    let interrupted = cancel.is_cancelled();
    ctrl_c.abort();

    let summary = result?;
    println!("{}", summary);
    if interrupted {
        println!("Interrupted; rerun to fetch the remaining objects.");
    }
    Ok(())
}
