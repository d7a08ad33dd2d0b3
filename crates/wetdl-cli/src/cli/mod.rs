//! CLI for the wetdl segment downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wetdl_core::config::{self, WetdlConfig};

use commands::{run_fetch_command, run_unzip_command, FetchOverrides, UnzipOverrides};

/// Top-level CLI for wetdl.
#[derive(Debug, Parser)]
#[command(name = "wetdl")]
#[command(about = "wetdl: budgeted batch downloader for web-crawl WET segments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every object listed in the manifest until the byte budget runs out.
    Fetch {
        /// Config file to use instead of ~/.config/wetdl/config.toml.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Manifest of object keys, one per line.
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
        /// Directory the downloaded files land in.
        #[arg(long, value_name = "PATH")]
        output_dir: Option<PathBuf>,
        /// Base URL the object keys are resolved against.
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Byte cap for the whole run.
        #[arg(long, value_name = "N")]
        max_bytes: Option<u64>,
        /// Maximum transfers in flight (0 = unlimited).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Pause between transfer launches, in milliseconds.
        #[arg(long, value_name = "N")]
        launch_delay_ms: Option<u64>,
        /// Seconds between progress lines.
        #[arg(long, value_name = "N")]
        progress_interval_secs: Option<u64>,
        /// Keep the bytes of failed transfers counted against the budget.
        #[arg(long)]
        retain_failed_reservations: bool,
    },

    /// Decompress downloaded .gz segments.
    Unzip {
        /// Config file to use instead of ~/.config/wetdl/config.toml.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Directory scanned (recursively) for .gz files.
        #[arg(long, value_name = "PATH")]
        input_dir: Option<PathBuf>,
        /// Directory the decompressed files land in.
        #[arg(long, value_name = "PATH")]
        output_dir: Option<PathBuf>,
        /// Files decompressed concurrently.
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },
}

fn load_config(path: Option<&Path>) -> Result<WetdlConfig> {
    let cfg = match path {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch {
                config,
                manifest,
                output_dir,
                base_url,
                max_bytes,
                jobs,
                launch_delay_ms,
                progress_interval_secs,
                retain_failed_reservations,
            } => {
                let cfg = load_config(config.as_deref())?;
                let overrides = FetchOverrides {
                    manifest,
                    output_dir,
                    base_url,
                    max_bytes,
                    jobs,
                    launch_delay_ms,
                    progress_interval_secs,
                    retain_failed_reservations,
                };
                run_fetch_command(overrides.apply(cfg)).await?;
            }
            CliCommand::Unzip {
                config,
                input_dir,
                output_dir,
                jobs,
            } => {
                let cfg = load_config(config.as_deref())?;
                let overrides = UnzipOverrides {
                    input_dir,
                    output_dir,
                    jobs,
                };
                run_unzip_command(overrides.apply(cfg)).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
