//! Line-delimited manifest of remote object keys.
//!
//! One key per line, relative to the configured base URL. Lines are trimmed and
//! blank lines are skipped; order is preserved. The reader is lazy: keys are read
//! from disk as the orchestrator asks for them.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest could not be opened. Fatal for the whole run.
    #[error("manifest {path} unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A line could not be read (I/O error or invalid UTF-8).
    #[error("manifest {path}: read failed after line {line}: {source}")]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Iterator over the non-blank, trimmed keys of a manifest file.
#[derive(Debug)]
pub struct ManifestReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl ManifestReader {
    /// Open `path` for reading. Fails with `ManifestError::Unavailable` if it cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path).map_err(|source| ManifestError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for ManifestReader {
    type Item = Result<String, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(ManifestError::Read {
                        path: self.path.clone(),
                        line: self.line_no,
                        source,
                    }))
                }
            };
            self.line_no += 1;
            let key = line.trim();
            if key.is_empty() {
                continue;
            }
            return Some(Ok(key.to_string()));
        }
    }
}
