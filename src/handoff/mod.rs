//! Process handoff: resolve an executable and transfer control to it.
//!
//! Two launchers satisfy the same contract ("behave as if this process became
//! the target"): `ExecLauncher` replaces the process image in place (Unix),
//! `SpawnLauncher` runs a child, forwards signals and exits with its status.

#[cfg(unix)]
mod exec;
mod spawn;

#[cfg(unix)]
pub use exec::ExecLauncher;
pub use spawn::SpawnLauncher;

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::errors::HandoffError;

/// Looks up an executable by name.
pub trait PathResolver {
    fn resolve(&self, command: &str) -> Result<PathBuf, HandoffError>;
}

/// Resolves through the host search rules (PATH, plus PATHEXT on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichResolver;

impl PathResolver for WhichResolver {
    fn resolve(&self, command: &str) -> Result<PathBuf, HandoffError> {
        which::which(command).map_err(|source| HandoffError::Resolution {
            command: command.to_string(),
            source,
        })
    }
}

/// Transfers control to a resolved invocation.
///
/// Real launchers never return `Ok`: either the process image is gone or this
/// process has exited with the child's status.
pub trait ProcessLauncher {
    fn launch(&self, invocation: &Invocation, env: &[OsString]) -> Result<(), HandoffError>;
}

/// A resolved executable and its argument vector (`argv[0]` is the resolved path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    path: PathBuf,
    argv: Vec<OsString>,
}

impl Invocation {
    pub fn new(path: PathBuf, extra_args: &[String]) -> Self {
        let mut argv = Vec::with_capacity(extra_args.len() + 1);
        argv.push(path.as_os_str().to_os_string());
        argv.extend(extra_args.iter().map(OsString::from));
        Self { path, argv }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    pub(crate) fn exec_error(&self, source: std::io::Error) -> HandoffError {
        HandoffError::Exec {
            path: self.path.clone(),
            source,
        }
    }
}

/// Resolve `command` and build `[resolved_path, extra_args...]`.
pub fn resolve_invocation(
    resolver: &dyn PathResolver,
    command: &str,
    extra_args: &[String],
) -> Result<Invocation, HandoffError> {
    let path = resolver.resolve(command)?;
    Ok(Invocation::new(path, extra_args))
}

/// Resolve and launch in one step.
pub fn handoff(
    resolver: &dyn PathResolver,
    launcher: &dyn ProcessLauncher,
    command: &str,
    extra_args: &[String],
    env: &[OsString],
) -> Result<(), HandoffError> {
    let invocation = resolve_invocation(resolver, command, extra_args)?;
    launcher.launch(&invocation, env)
}

/// In-place replacement where the platform has it, spawn-and-forward elsewhere.
pub fn default_launcher() -> Box<dyn ProcessLauncher> {
    #[cfg(unix)]
    {
        Box::new(ExecLauncher)
    }
    #[cfg(not(unix))]
    {
        Box::new(SpawnLauncher)
    }
}

/// Split `KEY=VALUE` for APIs taking pairs. Windows keeps per-drive entries
/// such as `=C:=C:\work`, so a leading `=` belongs to the key.
pub(crate) fn split_env_entry(entry: &OsStr) -> Option<(&OsStr, &OsStr)> {
    let bytes = entry.as_encoded_bytes();
    let search_from = usize::from(bytes.first() == Some(&b'='));
    let pos = bytes[search_from..].iter().position(|b| *b == b'=')? + search_from;
    // SAFETY: both halves border an ASCII `=`, a valid split point of the encoding.
    let (key, value) = unsafe {
        (
            OsStr::from_encoded_bytes_unchecked(&bytes[..pos]),
            OsStr::from_encoded_bytes_unchecked(&bytes[pos + 1..]),
        )
    };
    Some((key, value))
}
