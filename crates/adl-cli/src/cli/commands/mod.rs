//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod fetch;
mod get;
mod run;
mod watch;

pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use fetch::run_fetch;
pub use get::{run_get, GetRequest};
pub use run::ConflictPolicy;
pub use watch::run_watch;
