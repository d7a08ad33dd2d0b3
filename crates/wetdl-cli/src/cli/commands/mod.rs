//! CLI command handlers, one file per subcommand.

mod fetch;
mod unzip;

pub use fetch::{run_fetch_command, FetchOverrides};
pub use unzip::{run_unzip_command, UnzipOverrides};
