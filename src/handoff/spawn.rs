use std::ffi::OsString;
use std::process::{Command, ExitStatus};
use std::time::Duration;

use wait_timeout::ChildExt;

use super::{split_env_entry, Invocation, ProcessLauncher};
use crate::errors::HandoffError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the target as a child, forwards termination signals to it and exits
/// with the child's status. Used where in-place replacement is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnLauncher;

impl SpawnLauncher {
    /// Spawn, forward signals until the child exits, return the exit code this
    /// process should report.
    pub fn run(&self, invocation: &Invocation, env: &[OsString]) -> Result<i32, HandoffError> {
        let mut cmd = Command::new(invocation.path());
        cmd.args(&invocation.argv()[1..]);
        cmd.env_clear();
        for entry in env {
            if let Some((key, value)) = split_env_entry(entry) {
                cmd.env(key, value);
            }
        }

        let _forwarding = signals::Forwarding::install();
        let mut child = cmd.spawn().map_err(|e| invocation.exec_error(e))?;
        let status = loop {
            match child.wait_timeout(POLL_INTERVAL) {
                Ok(Some(status)) => break status,
                Ok(None) => signals::forward_pending(child.id()),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(invocation.exec_error(e));
                }
            }
        };
        Ok(exit_code_for_status(status))
    }
}

impl ProcessLauncher for SpawnLauncher {
    fn launch(&self, invocation: &Invocation, env: &[OsString]) -> Result<(), HandoffError> {
        let code = self.run(invocation, env)?;
        std::process::exit(code);
    }
}

/// Shell convention: the exit code, or 128 + signal number when the child was killed.
pub(crate) fn exit_code_for_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

#[cfg(unix)]
mod signals {
    use std::sync::atomic::{AtomicU64, Ordering};

    use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use nix::unistd::{getpgrp, Pid};

    const FORWARDED: [Signal; 6] = [
        Signal::SIGINT,
        Signal::SIGTERM,
        Signal::SIGHUP,
        Signal::SIGQUIT,
        Signal::SIGUSR1,
        Signal::SIGUSR2,
    ];

    // Sent by the terminal driver to the whole foreground process group.
    const KEYBOARD: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

    // One bit per signal number.
    static PENDING: AtomicU64 = AtomicU64::new(0);

    extern "C" fn record_signal(sig: nix::libc::c_int) {
        if (0..64).contains(&sig) {
            PENDING.fetch_or(1u64 << sig, Ordering::SeqCst);
        }
    }

    /// Handlers for the forwarded signals; previous dispositions are restored on drop.
    pub(super) struct Forwarding {
        previous: Vec<(Signal, SigAction)>,
    }

    impl Forwarding {
        pub(super) fn install() -> Self {
            PENDING.store(0, Ordering::SeqCst);
            let act = SigAction::new(
                SigHandler::Handler(record_signal),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );
            let mut previous = Vec::with_capacity(FORWARDED.len());
            for sig in FORWARDED {
                // SAFETY: the handler only touches an atomic.
                if let Ok(old) = unsafe { signal::sigaction(sig, &act) } {
                    previous.push((sig, old));
                }
            }
            Self { previous }
        }
    }

    impl Drop for Forwarding {
        fn drop(&mut self) {
            for (sig, old) in self.previous.drain(..) {
                // SAFETY: restores a disposition previously returned by sigaction.
                let _ = unsafe { signal::sigaction(sig, &old) };
            }
        }
    }

    /// Whether our process group (shared with the child) is the foreground
    /// group of the terminal on stdin.
    fn in_terminal_foreground() -> bool {
        // SAFETY: tcgetpgrp only queries the terminal; a non-terminal stdin yields -1.
        let foreground = unsafe { nix::libc::tcgetpgrp(nix::libc::STDIN_FILENO) };
        foreground > 0 && foreground == getpgrp().as_raw()
    }

    /// Keyboard signals have already reached a child in the terminal's
    /// foreground group.
    pub(super) fn should_forward(sig: Signal, in_foreground: bool) -> bool {
        !(in_foreground && KEYBOARD.contains(&sig))
    }

    pub(super) fn forward_pending(child: u32) {
        let bits = PENDING.swap(0, Ordering::SeqCst);
        if bits == 0 {
            return;
        }
        let in_foreground = in_terminal_foreground();
        let pid = Pid::from_raw(child as i32);
        for sig in FORWARDED {
            if bits & (1u64 << (sig as i32)) != 0 && should_forward(sig, in_foreground) {
                let _ = signal::kill(pid, sig);
            }
        }
    }
}

// Console control events reach every process attached to the console, the
// child included; nothing to forward.
#[cfg(not(unix))]
mod signals {
    pub(super) struct Forwarding;

    impl Forwarding {
        pub(super) fn install() -> Self {
            Forwarding
        }
    }

    pub(super) fn forward_pending(_child: u32) {}
}
