mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use ecs_task_helper::commands::{
    run_check, run_exec, run_metadata, CheckOptions, ExecDeps, MetadataDeps,
};
use ecs_task_helper::{
    config, current_environ, default_launcher, logging, CommandError, FetchContext,
    HttpMetadataFetcher, ProcessLauncher, SpawnLauncher, WhichResolver,
};

use crate::cli::{Cli, Command};

fn run(command: Command) -> Result<(), CommandError> {
    let ctx = FetchContext::background();
    let fetcher = HttpMetadataFetcher::new();

    match command {
        Command::Metadata { format } => {
            let deps = MetadataDeps {
                fetcher: &fetcher,
                timeout: config::metadata_timeout(),
            };
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_metadata(&deps, &ctx, format, &mut out)?;
            out.flush()?;
            Ok(())
        }
        Command::Exec { spawn, command } => {
            let launcher: Box<dyn ProcessLauncher> = if spawn {
                Box::new(SpawnLauncher)
            } else {
                default_launcher()
            };
            let deps = ExecDeps {
                fetcher: &fetcher,
                timeout: config::metadata_timeout(),
                environ: current_environ(),
                resolver: &WhichResolver,
                launcher: launcher.as_ref(),
            };
            run_exec(deps, &ctx, &command)
        }
        Command::Check {
            url,
            timeout,
            statuses,
            quiet,
        } => {
            let opts = CheckOptions {
                timeout,
                statuses,
                quiet,
            };
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_check(&url, &opts, &mut out)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("ecs-task-helper: {e}");
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
