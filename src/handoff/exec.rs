use std::ffi::{CString, OsString};
use std::io;
use std::os::unix::ffi::OsStrExt;

use nix::unistd::execve;

use super::{Invocation, ProcessLauncher};
use crate::errors::HandoffError;

/// Replaces the current process image via `execve(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecLauncher;

fn to_cstring(bytes: &[u8], what: &str) -> io::Result<CString> {
    CString::new(bytes).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} contains a NUL byte"),
        )
    })
}

impl ProcessLauncher for ExecLauncher {
    fn launch(&self, invocation: &Invocation, env: &[OsString]) -> Result<(), HandoffError> {
        let prepare = || -> io::Result<(CString, Vec<CString>, Vec<CString>)> {
            let path = to_cstring(invocation.path().as_os_str().as_bytes(), "program path")?;
            let argv = invocation
                .argv()
                .iter()
                .map(|a| to_cstring(a.as_bytes(), "argument"))
                .collect::<io::Result<Vec<_>>>()?;
            let envp = env
                .iter()
                .map(|e| to_cstring(e.as_bytes(), "environment entry"))
                .collect::<io::Result<Vec<_>>>()?;
            Ok((path, argv, envp))
        };
        let (path, argv, envp) = prepare().map_err(|e| invocation.exec_error(e))?;

        match execve(&path, &argv, &envp) {
            Ok(never) => match never {},
            Err(errno) => Err(invocation.exec_error(io::Error::from(errno))),
        }
    }
}
