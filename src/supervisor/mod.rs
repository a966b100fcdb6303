// src/supervisor/mod.rs

//! The provisioning supervisor.
//!
//! Ties the pieces together for one invocation:
//! - builds the script invocation from the [`ProvisionRun`]
//! - hands it to the [`DeadlineController`]
//! - turns the outcome into a [`Verdict`] via [`policy::decide`]
//! - after a successful run, checks the CA certificate contract

pub mod policy;

use tracing::{debug, info};

use crate::certs;
use crate::config::SupervisorConfig;
use crate::errors::Result;
use crate::exec::{CommandSpec, DeadlineController, OutputTarget};
use crate::types::{Hostname, ProvisionRun};

pub use policy::{Verdict, decide, timeout_message};

#[derive(Debug, Clone)]
pub struct Supervisor {
    config: SupervisorConfig,
    forward_interrupts: bool,
    foreground_terminal: bool,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            forward_interrupts: false,
            foreground_terminal: false,
        }
    }

    /// Forward Ctrl-C to the provisioning script (used by the binary).
    pub fn with_interrupt_forwarding(mut self, enabled: bool) -> Self {
        self.forward_interrupts = enabled;
        self
    }

    /// The tool owns the foreground of a terminal: the script then shares
    /// the tool's process group so it can use that terminal.
    pub fn with_foreground_terminal(mut self, foreground: bool) -> Self {
        self.foreground_terminal = foreground;
        self
    }

    pub fn provision_run(&self, hostname: Hostname) -> ProvisionRun {
        ProvisionRun::new(hostname, &self.config)
    }

    /// Run the provisioning script for `run` and decide the tool's exit
    /// behaviour.
    ///
    /// Errors are tool-level failures (the script could not be started, or
    /// its status was lost); the script failing or timing out is reported in
    /// the returned [`Verdict`].
    pub async fn supervise(&self, run: &ProvisionRun, output: OutputTarget) -> Result<Verdict> {
        info!(
            hostname = %run.hostname(),
            script = %run.script().display(),
            timeout_secs = run.timeout_secs(),
            "provisioning"
        );

        let mut spec = CommandSpec::for_run(run, &self.config);
        if self.foreground_terminal {
            debug!("running in a terminal foreground; script shares the tool's process group");
            spec = spec.shared_process_group();
        }
        let controller = DeadlineController::new(run.timeout(), self.config.on_timeout)
            .with_interrupt_forwarding(self.forward_interrupts);

        let outcome = controller.run(&spec, output).await?;
        let verdict = decide(outcome, run.timeout_secs());
        debug!(?outcome, exit_code = verdict.exit_code, "provisioning finished");

        if verdict.succeeded() && self.config.verify_ca_cert {
            certs::report_ca_cert(&self.config.ca_cert_path, run.hostname());
        }

        Ok(verdict)
    }
}
