use std::io::Write;
use std::time::Duration;

use crate::config::DEFAULT_CHECK_TIMEOUT;
use crate::errors::{CheckError, CommandError};

/// Options of the `check` health probe.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub timeout: Duration,
    /// Accepted status codes.
    pub statuses: Vec<u16>,
    /// Do not print the response body.
    pub quiet: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CHECK_TIMEOUT,
            statuses: vec![200],
            quiet: false,
        }
    }
}

/// GET `url` and succeed when the status is one of `opts.statuses`.
///
/// The body is written to `out` before the status is evaluated, so a failing
/// probe still shows what the endpoint answered.
pub fn run_check(url: &str, opts: &CheckOptions, out: &mut dyn Write) -> Result<(), CommandError> {
    let parsed = url::Url::parse(url).map_err(|source| CheckError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let client = reqwest::blocking::Client::builder()
        .timeout(opts.timeout)
        .no_proxy()
        .build()
        .map_err(CheckError::Request)?;
    let response = client.get(parsed).send().map_err(CheckError::Request)?;
    let status = response.status().as_u16();
    tracing::debug!(url, status, "check response");

    if !opts.quiet {
        let body = response.bytes().map_err(CheckError::Request)?;
        out.write_all(&body).map_err(CheckError::Output)?;
        out.flush().map_err(CheckError::Output)?;
    }

    if !opts.statuses.contains(&status) {
        return Err(CheckError::UnexpectedStatus(status).into());
    }
    Ok(())
}
