// src/exec/deadline.rs

//! Racing the provisioning script against its deadline.

use std::time::Duration;

use tracing::info;

use crate::errors::Result;
use crate::exec::output::OutputTarget;
use crate::exec::runner::{CommandSpec, RunningCommand, start};
use crate::exec::signal::forward_interrupts;
use crate::types::{ProcessExit, RunOutcome, TimeoutPolicy};

/// How long forwarded output may keep flowing after the race is decided.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Decides whether a run completed or timed out.
///
/// Exactly one [`RunOutcome`] is produced per run. If the script finishes
/// and the deadline elapses in the same instant, completion wins.
#[derive(Debug, Clone)]
pub struct DeadlineController {
    timeout: Duration,
    policy: TimeoutPolicy,
    drain_grace: Duration,
    forward_interrupts: bool,
}

enum Race {
    Finished(Result<ProcessExit>),
    Elapsed,
}

impl DeadlineController {
    pub fn new(timeout: Duration, policy: TimeoutPolicy) -> Self {
        Self {
            timeout,
            policy,
            drain_grace: DEFAULT_DRAIN_GRACE,
            forward_interrupts: false,
        }
    }

    /// Pass Ctrl-C on to the script while it runs; see
    /// [`forward_interrupts`](crate::exec::signal::forward_interrupts).
    pub fn with_interrupt_forwarding(mut self, enabled: bool) -> Self {
        self.forward_interrupts = enabled;
        self
    }

    /// Start `spec` and race it against the deadline.
    ///
    /// A launch failure is returned as an error before any racing happens.
    pub async fn run(&self, spec: &CommandSpec, output: OutputTarget) -> Result<RunOutcome> {
        let mut running = start(spec, output)?;

        let forwarder = match running.signal_target() {
            Some(target) if self.forward_interrupts => Some(forward_interrupts(target)),
            _ => None,
        };

        let outcome = self.race(&mut running).await;

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        outcome
    }

    /// Race an already started command against the deadline.
    ///
    /// On timeout this returns without waiting for the script to exit; with
    /// [`TimeoutPolicy::Kill`] the script is killed first.
    pub async fn race(&self, running: &mut RunningCommand) -> Result<RunOutcome> {
        let race = tokio::select! {
            // Completion is polled first so a script finishing right at the
            // deadline is not reported as timed out.
            biased;
            exit = running.wait() => Race::Finished(exit),
            () = tokio::time::sleep(self.timeout) => Race::Elapsed,
        };

        match race {
            Race::Finished(exit) => {
                let exit = exit?;
                running.drain_output(self.drain_grace).await;
                Ok(RunOutcome::Completed(exit.exit_code()))
            }
            Race::Elapsed => {
                info!(
                    pid = ?running.pid(),
                    timeout_secs = self.timeout.as_secs(),
                    policy = ?self.policy,
                    "provisioning script exceeded its deadline"
                );
                match self.policy {
                    TimeoutPolicy::Kill => running.kill(),
                    TimeoutPolicy::Abandon => {
                        info!(pid = ?running.pid(), "leaving provisioning script running");
                    }
                }
                running.drain_output(self.drain_grace).await;
                Ok(RunOutcome::TimedOut)
            }
        }
    }
}
