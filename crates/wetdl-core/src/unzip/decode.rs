//! Decompression of one gzip file into the output root.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::storage;

/// What happened to one `.gz` input.
#[derive(Debug)]
pub enum UnzipOutcome {
    Extracted { output: PathBuf, bytes: u64 },
    /// The decompressed counterpart already exists.
    Skipped { output: PathBuf },
    Failed { error: anyhow::Error },
}

/// `root/<name without .gz>`, or `None` if the name is just `.gz` or not UTF-8.
pub fn output_path_for(gz_path: &Path, output_root: &Path) -> Option<PathBuf> {
    let name = gz_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(".gz").filter(|s| !s.is_empty())?;
    Some(output_root.join(stem))
}

/// Decompresses `gz_path` into `output_root`, skipping it if the output exists.
///
/// All gzip members are decoded (WET files are multi-member). Output goes to a temp
/// file first and is renamed into place only after the whole stream decoded.
pub fn decompress_file(gz_path: &Path, output_root: &Path, seq: u64) -> UnzipOutcome {
    let Some(output) = output_path_for(gz_path, output_root) else {
        return UnzipOutcome::Failed {
            error: anyhow::anyhow!("no output name for {}", gz_path.display()),
        };
    };
    if output.exists() {
        return UnzipOutcome::Skipped { output };
    }

    let temp = storage::temp_path(&output, seq);
    match decode_into(gz_path, &temp, &output) {
        Ok(bytes) => UnzipOutcome::Extracted { output, bytes },
        Err(error) => {
            if let Err(e) = std::fs::remove_file(&temp) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %temp.display(), "failed to remove temp file: {}", e);
                }
            }
            UnzipOutcome::Failed { error }
        }
    }
}

fn decode_into(gz_path: &Path, temp: &Path, output: &Path) -> Result<u64> {
    let input = File::open(gz_path).with_context(|| format!("open {}", gz_path.display()))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let mut out = File::create(temp).with_context(|| format!("create {}", temp.display()))?;
    let bytes = io::copy(&mut decoder, &mut out)
        .with_context(|| format!("decompress {}", gz_path.display()))?;
    out.sync_all().context("sync decompressed file")?;
    drop(out);
    std::fs::rename(temp, output)
        .with_context(|| format!("rename {} to {}", temp.display(), output.display()))?;
    Ok(bytes)
}
