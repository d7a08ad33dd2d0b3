//! `wetdl unzip`: decompress downloaded segments.

use anyhow::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use wetdl_core::config::WetdlConfig;
use wetdl_core::{control, unzip};

#[derive(Debug, Default)]
pub struct UnzipOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
}

impl UnzipOverrides {
    pub fn apply(self, mut cfg: WetdlConfig) -> WetdlConfig {
        if let Some(v) = self.input_dir {
            cfg.unzip.input_dir = Some(v);
        }
        if let Some(v) = self.output_dir {
            cfg.unzip.output_dir = v;
        }
        if let Some(v) = self.jobs {
            cfg.unzip.max_concurrent = v;
        }
        cfg
    }
}

pub async fn run_unzip_command(cfg: WetdlConfig) -> Result<()> {
    cfg.validate_unzip()?;
    let cancel = CancellationToken::new();
    let ctrl_c = control::cancel_on_ctrl_c(cancel.clone());

    let result = unzip::run_unzip(
        cfg.unzip_input_dir(),
        &cfg.unzip.output_dir,
        cfg.unzip.max_concurrent,
        cancel.clone(),
    )
    .await;
    ctrl_c.abort();

    let summary = result?;
    println!("{}", summary);
    Ok(())
}
