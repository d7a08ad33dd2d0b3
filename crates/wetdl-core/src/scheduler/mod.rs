//! Batch scheduler.
//!
//! Coordinates the run: manifest → orchestrator → transfers, with a byte budget
//! shared by every transfer and a progress reporter reading it.

mod budget;
mod progress;
mod run;
mod summary;

pub use budget::{ByteBudget, Reservation};
pub use progress::{spawn_progress_reporter, ProgressStats};
pub use run::{run_batch, run_fetch, BatchSettings};
pub use summary::RunSummary;
