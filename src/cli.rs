use std::time::Duration;

use clap::{Parser, Subcommand};
use ecs_task_helper::commands::OutputFormat;
use ecs_task_helper::config::parse_duration_arg;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ntarget:  ",
    env!("ECS_TASK_HELPER_BUILD_TARGET"),
    "\nprofile: ",
    env!("ECS_TASK_HELPER_BUILD_PROFILE"),
    "\nbuilt:   ",
    env!("ECS_TASK_HELPER_BUILD_DATE"),
    "\nrustc:   ",
    env!("ECS_TASK_HELPER_BUILD_RUSTC"),
);

#[derive(Parser, Debug)]
#[command(
    name = "ecs-task-helper",
    version,
    long_version = LONG_VERSION,
    about = "ECS task helper utilities",
    after_long_help = "Environment:\n  ECS_CONTAINER_METADATA_URI_V4          task metadata endpoint (set by the ECS agent)\n  ECS_CONTAINER_METADATA_URI_V4_TIMEOUT  metadata fetch timeout, e.g. 500ms or 5s (default: 5s)\n  ECS_TASK_HELPER_LOG                    log filter, e.g. debug (default: info)\n"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Print ECS metadata as environment variables or JSON
    Metadata {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Env)]
        format: OutputFormat,
    },

    /// Execute a command with ECS metadata environment variables
    #[command(override_usage = "ecs-task-helper exec [OPTIONS] <COMMAND> [ARGS]...")]
    Exec {
        /// Run the command as a child process and forward signals to it
        /// instead of replacing this process
        #[arg(long)]
        spawn: bool,

        /// Command and its arguments, passed through verbatim
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND"
        )]
        command: Vec<String>,
    },

    /// Check HTTP endpoint availability
    ///
    /// Lightweight HTTP client for checking endpoint availability. Exits 0 on
    /// success, 1 on failure.
    Check {
        /// URL to GET
        url: String,

        /// Request timeout
        #[arg(long, value_parser = parse_duration_arg, default_value = "1s")]
        timeout: Duration,

        /// Expected HTTP status codes (repeatable or comma-separated)
        #[arg(long = "status", value_delimiter = ',', default_values_t = [200u16])]
        statuses: Vec<u16>,

        /// Suppress output
        #[arg(long)]
        quiet: bool,
    },
}
