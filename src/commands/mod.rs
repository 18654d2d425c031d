//! Subcommand orchestration. Capabilities are passed in so the policies can be
//! exercised without a metadata endpoint or a real process handoff.

mod check;
mod exec;
mod metadata;

pub use check::{run_check, CheckOptions};
pub use exec::{run_exec, ExecDeps};
pub use metadata::{run_metadata, MetadataDeps, OutputFormat};
