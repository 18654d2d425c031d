//! ECS task helper: read the container metadata endpoint and hand a process
//! the task's identity as `ECS_*` environment variables.
//!
//! - `metadata`: the record, its environment projection and the HTTP fetcher.
//! - `handoff`: executable resolution and process replacement (or spawn-and-forward).
//! - `commands`: the `metadata`, `exec` and `check` subcommands.

pub mod commands;
pub mod config;
pub mod errors;
pub mod handoff;
pub mod logging;
pub mod metadata;

pub use errors::{exit_code_for_io_error, CheckError, CommandError, FetchError, HandoffError, TransportError};
pub use handoff::{
    default_launcher, handoff, resolve_invocation, Invocation, PathResolver, ProcessLauncher,
    SpawnLauncher, WhichResolver,
};
#[cfg(unix)]
pub use handoff::ExecLauncher;
pub use metadata::{
    current_environ, FetchContext, HttpMetadataFetcher, MetadataFetcher, MetadataRecord,
    DERIVED_KEYS,
};
