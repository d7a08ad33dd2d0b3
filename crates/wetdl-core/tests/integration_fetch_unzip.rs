//! Integration test: fetched gzip segments feed the unzip stage.

mod common;

use std::io::Write;

use common::object_server::{self, Reply};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use wetdl_core::config::WetdlConfig;
use wetdl_core::{scheduler, unzip};

fn gzip(text: &str) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap()
}

#[tokio::test]
async fn fetched_segments_are_extracted() {
    let a = "WARC/1.0\r\nWARC-Type: conversion\r\n\r\nfirst page text\n";
    let b = "WARC/1.0\r\nWARC-Type: conversion\r\n\r\nsecond page text\n";
    let server = object_server::start(vec![
        ("/crawl/wet/seg-00000.warc.wet.gz", Reply::Body(gzip(a))),
        ("/crawl/wet/seg-00001.warc.wet.gz", Reply::Body(gzip(b))),
    ]);

    let dir = tempdir().unwrap();
    let manifest = dir.path().join("wet.paths");
    std::fs::write(
        &manifest,
        "crawl/wet/seg-00000.warc.wet.gz\ncrawl/wet/seg-00001.warc.wet.gz\n",
    )
    .unwrap();
    let cfg = WetdlConfig {
        base_url: server.base_url().to_string(),
        manifest_path: manifest,
        output_dir: dir.path().join("Wet-Files"),
        launch_delay_ms: 0,
        ..WetdlConfig::default()
    };

    let fetched = scheduler::run_fetch(&cfg, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(fetched.downloaded, 2);

    let out = dir.path().join("unzipped");
    let summary = unzip::run_unzip(&cfg.output_dir, &out, 2, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.found, 2);
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        std::fs::read_to_string(out.join("seg-00000.warc.wet")).unwrap(),
        a
    );
    assert_eq!(
        std::fs::read_to_string(out.join("seg-00001.warc.wet")).unwrap(),
        b
    );

    // Second pass finds existing outputs and leaves them alone.
    let again = unzip::run_unzip(&cfg.output_dir, &out, 2, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(again.skipped, 2);
    assert_eq!(again.extracted, 0);
}
