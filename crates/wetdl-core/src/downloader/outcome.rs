//! Terminal states of a transfer.

use std::fmt;
use std::io;

/// Why a transfer ended without downloading anything. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination already exists; no request was made.
    AlreadyExists,
    /// Reserving the declared size would exceed the byte cap.
    BudgetExhausted,
    /// The response declared no size, or a size of zero.
    NoContentLength,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyExists => write!(f, "already exists"),
            SkipReason::BudgetExhausted => write!(f, "byte budget exhausted"),
            SkipReason::NoContentLength => write!(f, "no content length"),
        }
    }
}

/// Per-transfer failure. Contained to its task; the run continues.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Connect, TLS, timeout or mid-stream receive failure.
    #[error("network: {0}")]
    Network(#[source] curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u32),
    /// Creating, writing, syncing or renaming the local file failed.
    #[error("filesystem: {0}")]
    Filesystem(#[source] io::Error),
    /// The body length did not match the declared Content-Length.
    #[error("body length mismatch: expected {expected} bytes, got {received}")]
    LengthMismatch { expected: u64, received: u64 },
    /// The key has no usable final segment or does not form a valid URL.
    #[error("invalid object key {0:?}")]
    InvalidKey(String),
    /// Shutdown was requested while the transfer was in flight.
    #[error("cancelled")]
    Cancelled,
    /// The worker task panicked or was aborted.
    #[error("worker: {0}")]
    Worker(String),
}

/// Coarse classification of a `TransferError` for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    HttpStatus,
    Filesystem,
    InvalidKey,
    Cancelled,
    /// The task panicked or was aborted; the cause is not known.
    Worker,
}

impl TransferError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransferError::Network(_) | TransferError::LengthMismatch { .. } => {
                FailureKind::Network
            }
            TransferError::HttpStatus(_) => FailureKind::HttpStatus,
            TransferError::Filesystem(_) => FailureKind::Filesystem,
            TransferError::Worker(_) => FailureKind::Worker,
            TransferError::InvalidKey(_) => FailureKind::InvalidKey,
            TransferError::Cancelled => FailureKind::Cancelled,
        }
    }
}

/// Result of one task. Produced exactly once per task.
#[derive(Debug)]
pub enum TransferOutcome {
    Skipped(SkipReason),
    Downloaded { bytes: u64 },
    Failed(TransferError),
}

impl TransferOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, TransferOutcome::Downloaded { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            TransferOutcome::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TransferOutcome::Failed(e) => Some(e.kind()),
            _ => None,
        }
    }
}
