use std::io::Write;
use std::time::Duration;

use crate::errors::{CommandError, FetchError};
use crate::metadata::{FetchContext, MetadataFetcher};

/// Presentation of the metadata record.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `KEY=VALUE` line per ECS_* variable
    #[default]
    Env,
    /// A single JSON object
    Json,
}

pub struct MetadataDeps<'a> {
    pub fetcher: &'a dyn MetadataFetcher,
    pub timeout: Duration,
}

/// Print task metadata in `format`.
///
/// Without an endpoint, `env` prints nothing and `json` prints `{}`; both succeed.
pub fn run_metadata(
    deps: &MetadataDeps<'_>,
    ctx: &FetchContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let record = match deps.fetcher.fetch(ctx, deps.timeout) {
        Ok(record) => record,
        Err(FetchError::MissingEndpoint) => {
            tracing::warn!("missing ECS metadata URI");
            if format == OutputFormat::Json {
                writeln!(out, "{{}}")?;
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => {
            let data = serde_json::to_string(&record).map_err(std::io::Error::from)?;
            writeln!(out, "{data}")?;
        }
        OutputFormat::Env => {
            for entry in record.environ() {
                writeln!(out, "{entry}")?;
            }
        }
    }
    Ok(())
}
