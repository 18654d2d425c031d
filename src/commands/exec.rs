use std::ffi::OsString;
use std::time::Duration;

use crate::errors::{CommandError, FetchError};
use crate::handoff::{resolve_invocation, PathResolver, ProcessLauncher};
use crate::metadata::{FetchContext, MetadataFetcher};

pub struct ExecDeps<'a> {
    pub fetcher: &'a dyn MetadataFetcher,
    pub timeout: Duration,
    /// Base environment handed to the command (normally the current one).
    pub environ: Vec<OsString>,
    pub resolver: &'a dyn PathResolver,
    pub launcher: &'a dyn ProcessLauncher,
}

/// Run `command[0]` with `command[1..]`, with task metadata merged into the environment.
///
/// The command is resolved before metadata is fetched. A missing endpoint
/// downgrades to the unmodified base environment; any other fetch failure
/// aborts before the handoff. With a real launcher this returns only on error.
pub fn run_exec(
    deps: ExecDeps<'_>,
    ctx: &FetchContext,
    command: &[String],
) -> Result<(), CommandError> {
    let Some((name, args)) = command.split_first() else {
        return Err(CommandError::Usage("no command given".to_string()));
    };

    let invocation = resolve_invocation(deps.resolver, name, args)?;
    tracing::debug!(path = %invocation.path().display(), "resolved command");

    let environ = match deps.fetcher.fetch(ctx, deps.timeout) {
        Ok(record) => record.environ_with(deps.environ.as_slice()),
        Err(FetchError::MissingEndpoint) => {
            tracing::warn!("missing ECS metadata URI, using current environment");
            deps.environ
        }
        Err(e) => return Err(e.into()),
    };

    deps.launcher.launch(&invocation, &environ)?;
    Ok(())
}
