//! Blocking single-GET transfer of one object through libcurl.

use std::sync::Arc;
use std::time::Duration;

use curl::easy::Easy2;
use tokio_util::sync::CancellationToken;

use crate::scheduler::ByteBudget;
use crate::storage;

use super::handler::TransferHandler;
use super::outcome::{TransferError, TransferOutcome};
use super::{CurlOptions, Task};

fn configure(easy: &mut Easy2<TransferHandler>, url: &str, curl: CurlOptions) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(curl.connect_timeout)?;
    // Abort if throughput stays below 1 KiB/s for 60s instead of a hard wall-clock
    // limit; archive segments can legitimately take a long time.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    // Progress callbacks are how a shutdown request reaches a transfer stuck in recv.
    easy.progress(true)?;
    Ok(())
}

/// Downloads `task` with a single GET. Runs in the current thread; call from
/// `spawn_blocking` when used from async code.
pub(super) fn fetch_object(
    task: &Task,
    budget: Arc<ByteBudget>,
    curl: CurlOptions,
    cancel: CancellationToken,
) -> TransferOutcome {
    let temp_path = storage::temp_path(&task.destination, task.seq);
    let mut easy = Easy2::new(TransferHandler::new(budget, temp_path, cancel));
    if let Err(e) = configure(&mut easy, task.source_url.as_str(), curl) {
        return TransferOutcome::Failed(TransferError::Network(e));
    }

    let result = easy.perform();
    let code = easy.response_code().unwrap_or(0);
    easy.get_mut().finish(result, code, &task.destination)
}
