//! Easy2 Handler for one object transfer.
//!
//! The budget gate sits in front of the first body byte: status and declared
//! length are checked and the size reserved before any temp file exists. Refusals
//! and write failures are recorded and signalled to libcurl by returning 0, which
//! aborts the transfer.

use std::io;
use std::path::{Path, PathBuf};
use std::str;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::scheduler::{ByteBudget, Reservation};
use crate::storage::{StorageWriter, StorageWriterBuilder};

use super::outcome::{SkipReason, TransferError, TransferOutcome};

/// Status code from an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 404`).
pub(super) fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Value of a `Content-Length` header line, if `line` is one.
pub(super) fn parse_content_length(line: &str) -> Option<u64> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse().ok()
}

/// Keeps an anyhow context chain readable while preserving the io kind underneath.
fn into_io(e: anyhow::Error) -> io::Error {
    let kind = e
        .downcast_ref::<io::Error>()
        .map(|e| e.kind())
        .unwrap_or(io::ErrorKind::Other);
    io::Error::new(kind, format!("{:#}", e))
}

/// Handler state for one object transfer. Implements curl's Handler for Easy2.
pub(crate) struct TransferHandler {
    pub(super) budget: Arc<ByteBudget>,
    pub(super) temp_path: PathBuf,
    pub(super) cancel: CancellationToken,
    /// Status of the latest response (reset on each status line, so redirects don't count).
    pub(super) status: Option<u32>,
    pub(super) content_length: Option<u64>,
    pub(super) reservation: Option<Reservation>,
    pub(super) storage: Option<StorageWriter>,
    pub(super) bytes_written: u64,
    /// Set once the transfer has been refused or has failed inside a callback.
    pub(super) stopped: Option<TransferOutcome>,
}

impl TransferHandler {
    pub(crate) fn new(budget: Arc<ByteBudget>, temp_path: PathBuf, cancel: CancellationToken) -> Self {
        Self {
            budget,
            temp_path,
            cancel,
            status: None,
            content_length: None,
            reservation: None,
            storage: None,
            bytes_written: 0,
            stopped: None,
        }
    }

    /// Runs on the first body chunk: status check, length check, reservation, temp file.
    fn open(&mut self) -> Result<(), TransferOutcome> {
        let status = self.status.unwrap_or(0);
        if !(200..300).contains(&status) {
            return Err(TransferOutcome::Failed(TransferError::HttpStatus(status)));
        }
        let declared = match self.content_length {
            Some(n) if n > 0 => n,
            _ => return Err(TransferOutcome::Skipped(SkipReason::NoContentLength)),
        };
        let reservation = self
            .budget
            .reserve(declared)
            .ok_or(TransferOutcome::Skipped(SkipReason::BudgetExhausted))?;
        let storage = StorageWriterBuilder::create(&self.temp_path)
            .and_then(|mut builder| {
                builder.preallocate(declared)?;
                Ok(builder.build())
            })
            .map_err(|e| TransferOutcome::Failed(TransferError::Filesystem(into_io(e))))?;
        self.reservation = Some(reservation);
        self.storage = Some(storage);
        Ok(())
    }

    /// Remove the temp file (if any) and give back an uncommitted reservation.
    fn discard(&mut self) {
        if let Some(storage) = self.storage.take() {
            storage.discard();
        }
        self.reservation.take();
    }

    /// Turn the finished (or aborted) perform into the task's outcome, renaming the
    /// temp file to `destination` only when the full declared body arrived.
    pub(super) fn finish(
        &mut self,
        result: Result<(), curl::Error>,
        response_code: u32,
        destination: &Path,
    ) -> TransferOutcome {
        if let Some(outcome) = self.stopped.take() {
            self.discard();
            return outcome;
        }
        if let Err(e) = result {
            self.discard();
            if e.is_aborted_by_callback() || self.cancel.is_cancelled() {
                return TransferOutcome::Failed(TransferError::Cancelled);
            }
            return TransferOutcome::Failed(TransferError::Network(e));
        }
        if !(200..300).contains(&response_code) {
            self.discard();
            return TransferOutcome::Failed(TransferError::HttpStatus(response_code));
        }

        let (Some(storage), Some(reservation)) = (self.storage.take(), self.reservation.take())
        else {
            // No body byte ever arrived.
            return match self.content_length {
                Some(expected) if expected > 0 => {
                    TransferOutcome::Failed(TransferError::LengthMismatch {
                        expected,
                        received: 0,
                    })
                }
                _ => TransferOutcome::Skipped(SkipReason::NoContentLength),
            };
        };

        let expected = reservation.amount();
        if self.bytes_written != expected {
            storage.discard();
            return TransferOutcome::Failed(TransferError::LengthMismatch {
                expected,
                received: self.bytes_written,
            });
        }
        if let Err(e) = storage.sync() {
            storage.discard();
            return TransferOutcome::Failed(TransferError::Filesystem(into_io(e)));
        }
        let temp_path = storage.temp_path().to_path_buf();
        if let Err(e) = storage.finalize(destination) {
            let _ = std::fs::remove_file(&temp_path);
            return TransferOutcome::Failed(TransferError::Filesystem(into_io(e)));
        }
        reservation.commit();
        TransferOutcome::Downloaded {
            bytes: self.bytes_written,
        }
    }
}

impl curl::easy::Handler for TransferHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if let Some(code) = parse_status_line(line) {
                self.status = Some(code);
                self.content_length = None;
            } else if let Some(n) = parse_content_length(line) {
                self.content_length = Some(n);
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if self.stopped.is_some() {
            return Ok(0);
        }
        if self.cancel.is_cancelled() {
            self.stopped = Some(TransferOutcome::Failed(TransferError::Cancelled));
            return Ok(0);
        }
        if self.storage.is_none() {
            if let Err(outcome) = self.open() {
                self.stopped = Some(outcome);
                return Ok(0);
            }
        }
        let Some(storage) = self.storage.as_ref() else {
            return Ok(0);
        };

        let n = data.len() as u64;
        let declared = self.reservation.as_ref().map_or(0, Reservation::amount);
        if self.bytes_written + n > declared {
            self.stopped = Some(TransferOutcome::Failed(TransferError::LengthMismatch {
                expected: declared,
                received: self.bytes_written + n,
            }));
            return Ok(0);
        }
        match storage.write_at(self.bytes_written, data) {
            Ok(()) => {
                self.bytes_written += n;
                Ok(data.len())
            }
            Err(e) => {
                self.stopped = Some(TransferOutcome::Failed(TransferError::Filesystem(e)));
                Ok(0)
            }
        }
    }

    fn progress(&mut self, _dltotal: f64, _dlnow: f64, _ultotal: f64, _ulnow: f64) -> bool {
        !self.cancel.is_cancelled()
    }
}
