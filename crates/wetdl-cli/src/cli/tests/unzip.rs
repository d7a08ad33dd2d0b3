//! Tests for the unzip subcommand.

use super::parse;
use crate::cli::commands::UnzipOverrides;
use crate::cli::CliCommand;
use std::path::{Path, PathBuf};
use wetdl_core::config::WetdlConfig;

#[test]
fn cli_parse_unzip_defaults() {
    match parse(&["wetdl", "unzip"]) {
        CliCommand::Unzip {
            config,
            input_dir,
            output_dir,
            jobs,
        } => {
            assert!(config.is_none());
            assert!(input_dir.is_none());
            assert!(output_dir.is_none());
            assert!(jobs.is_none());
        }
        _ => panic!("expected Unzip"),
    }
}

#[test]
fn cli_parse_unzip_dirs() {
    match parse(&[
        "wetdl",
        "unzip",
        "--input-dir",
        "Wet-Files",
        "--output-dir",
        "text",
        "--jobs",
        "2",
    ]) {
        CliCommand::Unzip {
            input_dir,
            output_dir,
            jobs,
            ..
        } => {
            assert_eq!(input_dir.as_deref(), Some(Path::new("Wet-Files")));
            assert_eq!(output_dir.as_deref(), Some(Path::new("text")));
            assert_eq!(jobs, Some(2));
        }
        _ => panic!("expected Unzip with dirs"),
    }
}

#[test]
fn unzip_input_defaults_to_fetch_output() {
    let base = WetdlConfig {
        output_dir: PathBuf::from("/srv/wet"),
        ..WetdlConfig::default()
    };
    let cfg = UnzipOverrides::default().apply(base);
    assert_eq!(cfg.unzip_input_dir(), Path::new("/srv/wet"));

    let cfg = UnzipOverrides {
        input_dir: Some(PathBuf::from("/elsewhere")),
        jobs: Some(3),
        ..UnzipOverrides::default()
    }
    .apply(cfg);
    assert_eq!(cfg.unzip_input_dir(), Path::new("/elsewhere"));
    assert_eq!(cfg.unzip.max_concurrent, 3);
}

#[test]
fn cli_rejects_unknown_subcommand() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["wetdl", "add", "x"]).is_err());
}
