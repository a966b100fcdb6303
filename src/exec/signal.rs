// src/exec/signal.rs

//! Signalling the provisioning script.
//!
//! Outside a terminal session the script leads its own process group, so its
//! pid is also the group id and one `killpg` reaches every process it spawned
//! (unless they moved themselves into another group).
//!
//! When the tool runs in the foreground of a terminal the script stays in
//! the tool's foreground group instead, so it can read from and configure
//! the terminal. Only the script itself can be signalled then.

use std::io;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which processes a signal reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalTarget {
    /// Every process in the group led by this pid.
    Group(u32),
    /// Only this process.
    Process(u32),
}

impl SignalTarget {
    pub fn pid(self) -> u32 {
        match self {
            SignalTarget::Group(pid) | SignalTarget::Process(pid) => pid,
        }
    }
}

/// Signals the supervisor sends to the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSignal {
    Interrupt,
    Kill,
}

#[cfg(unix)]
impl From<ScriptSignal> for nix::sys::signal::Signal {
    fn from(signal: ScriptSignal) -> Self {
        match signal {
            ScriptSignal::Interrupt => nix::sys::signal::Signal::SIGINT,
            ScriptSignal::Kill => nix::sys::signal::Signal::SIGKILL,
        }
    }
}

#[cfg(unix)]
pub fn send_signal(target: SignalTarget, signal: ScriptSignal) -> io::Result<()> {
    use nix::sys::signal::{Signal, kill, killpg};
    use nix::unistd::Pid;

    let raw = i32::try_from(target.pid()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("pid {} out of range", target.pid()),
        )
    })?;
    let pid = Pid::from_raw(raw);
    let signal = Signal::from(signal);

    let sent = match target {
        SignalTarget::Group(_) => killpg(pid, signal),
        SignalTarget::Process(_) => kill(pid, signal),
    };
    sent.map_err(io::Error::from)
}

#[cfg(not(unix))]
pub fn send_signal(_target: SignalTarget, _signal: ScriptSignal) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "signalling the provisioning script is only supported on Unix",
    ))
}

/// Whether the tool is in the foreground process group of its controlling
/// terminal.
#[cfg(unix)]
pub fn in_foreground_terminal() -> bool {
    use nix::unistd::{getpgrp, tcgetpgrp};

    let Ok(tty) = std::fs::File::open("/dev/tty") else {
        return false;
    };
    matches!(tcgetpgrp(&tty), Ok(pgrp) if pgrp == getpgrp())
}

#[cfg(not(unix))]
pub fn in_foreground_terminal() -> bool {
    false
}

/// Pass Ctrl-C on to the script while it runs.
///
/// The first Ctrl-C becomes SIGINT for the script's group. With a shared
/// terminal group the terminal has already delivered it, so nothing is sent.
/// Any further Ctrl-C kills the script, so one that ignores SIGINT can still
/// be stopped. The returned task runs until aborted.
pub fn forward_interrupts(target: SignalTarget) -> JoinHandle<()> {
    tokio::spawn(async move {
        let pid = target.pid();
        let mut received = 0u32;

        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            received += 1;

            let signal = if received == 1 {
                ScriptSignal::Interrupt
            } else {
                ScriptSignal::Kill
            };

            if signal == ScriptSignal::Interrupt && matches!(target, SignalTarget::Process(_)) {
                info!(pid, "Ctrl+C received; waiting for provisioning script to stop");
                continue;
            }

            info!(pid, ?signal, "Ctrl+C received; signalling provisioning script");
            if let Err(e) = send_signal(target, signal) {
                debug!(pid, error = %e, "could not signal provisioning script");
            }
        }
    })
}
