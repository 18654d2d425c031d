//! Error taxonomy and exit-code mapping.
//!
//! - `FetchError::MissingEndpoint` is the only recoverable kind; the `exec` and
//!   `metadata` commands downgrade it, nothing else does.
//! - Resolution failures map to exit code 127 (command not found); every other
//!   failure maps to 1.
//! - Display strings are the single diagnostic line printed by `main`; keep them stable.
use std::io;
use std::path::PathBuf;

/// Failure kinds of a metadata fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("environment variable ECS_CONTAINER_METADATA_URI_V4 is missing")]
    MissingEndpoint,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode metadata response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Cause carried by `FetchError::Transport`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to execute metadata request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("metadata request failed with status {0}")]
    Status(u16),
    #[error("deadline exceeded before metadata request was sent")]
    DeadlineExceeded,
}

impl FetchError {
    pub fn is_missing_endpoint(&self) -> bool {
        matches!(self, FetchError::MissingEndpoint)
    }
}

/// Failure kinds of a process handoff. Success never returns.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("can't find command {command}: {source}")]
    Resolution {
        command: String,
        #[source]
        source: which::Error,
    },
    #[error("command execution failed for {}: {source}", .path.display())]
    Exec {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of the `check` health probe.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to write response body: {0}")]
    Output(#[source] io::Error),
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),
}

/// Errors surfaced by subcommands to `main`.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("can't retrieve ECS task metadata: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Handoff(#[from] HandoffError),
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("{0}")]
    Usage(String),
}

impl CommandError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Handoff(HandoffError::Resolution { .. }) => 127,
            CommandError::Handoff(HandoffError::Exec { source, .. }) => {
                exit_code_for_io_error(source)
            }
            _ => 1,
        }
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}
