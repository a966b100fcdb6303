// src/exec/runner.rs

//! Starting the provisioning script.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::anyhow;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SupervisorConfig;
use crate::errors::{PcfdevError, Result};
use crate::exec::output::{OutputTarget, pump};
use crate::exec::signal::{ScriptSignal, SignalTarget, send_signal};
use crate::types::{ProcessExit, ProvisionRun};

/// What to execute and in which environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory; inherited from the tool when `None`.
    pub working_dir: Option<PathBuf>,
    /// Variables added to the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Start the script as leader of a new process group (Unix). When
    /// `false` it joins the tool's group, keeping access to a controlling
    /// terminal.
    pub own_process_group: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            own_process_group: true,
        }
    }

    /// The script invocation for a provisioning run: the script path with the
    /// hostname as its only argument.
    pub fn for_run(run: &ProvisionRun, config: &SupervisorConfig) -> Self {
        Self {
            program: run.script().to_path_buf(),
            args: vec![run.hostname().to_string()],
            working_dir: config.working_dir.clone(),
            env: config.env.clone(),
            own_process_group: true,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Keep the script in the tool's process group.
    pub fn shared_process_group(mut self) -> Self {
        self.own_process_group = false;
        self
    }
}

/// Handle to a started script.
///
/// - `completion` fires exactly once with the script's terminal status.
/// - `kill` asks the waiter task to kill the child directly (the script's
///   [`SignalTarget`] is signalled separately on Unix).
/// - `pumps` are the output-forwarding tasks (empty when output is inherited).
#[derive(Debug)]
pub struct RunningCommand {
    target: Option<SignalTarget>,
    completion: oneshot::Receiver<std::io::Result<ProcessExit>>,
    kill: Option<oneshot::Sender<()>>,
    pumps: Vec<JoinHandle<()>>,
}

impl RunningCommand {
    pub fn pid(&self) -> Option<u32> {
        self.target.map(SignalTarget::pid)
    }

    /// What a signal meant for the whole script reaches.
    pub fn signal_target(&self) -> Option<SignalTarget> {
        self.target
    }

    /// Wait for the script to exit.
    ///
    /// Must not be called again after it has returned.
    pub async fn wait(&mut self) -> Result<ProcessExit> {
        match (&mut self.completion).await {
            Ok(status) => Ok(status?),
            Err(_) => Err(PcfdevError::Other(anyhow!(
                "process waiter stopped without reporting an exit status"
            ))),
        }
    }

    /// Kill the script (and its process group, when it has its own) without
    /// waiting for it to exit.
    pub fn kill(&mut self) {
        if let Some(target) = self.target {
            match send_signal(target, ScriptSignal::Kill) {
                Ok(()) => debug!(?target, "sent SIGKILL to provisioning script"),
                Err(e) => debug!(?target, error = %e, "could not signal provisioning script"),
            }
        }
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }

    /// Give the output pumps up to `grace` to deliver what the script has
    /// already written, then stop them.
    ///
    /// Pumps can outlive the script when a background process it started
    /// still holds the pipes open.
    pub async fn drain_output(&mut self, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        for mut pump in std::mem::take(&mut self.pumps) {
            if tokio::time::timeout_at(deadline, &mut pump).await.is_err() {
                debug!("output still open after drain grace period; detaching");
                pump.abort();
            }
        }
    }
}

/// Start `spec`, wiring its output according to `output`.
///
/// Spawn failures (missing file, no execute permission) are returned as
/// [`PcfdevError::Launch`]. Once started, the script's exit status is only
/// reported through [`RunningCommand::wait`]; a non-zero exit is not an error
/// here.
pub fn start(spec: &CommandSpec, output: OutputTarget) -> Result<RunningCommand> {
    info!(
        script = %spec.program.display(),
        args = ?spec.args,
        "starting provisioning script"
    );

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args).envs(&spec.env).stdin(Stdio::null());

    if let Some(ref dir) = spec.working_dir {
        cmd.current_dir(dir);
    }

    // Own process group: lets us signal the whole tree on timeout.
    #[cfg(unix)]
    if spec.own_process_group {
        cmd.process_group(0);
    }

    let sinks = match output {
        OutputTarget::Inherit => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            None
        }
        OutputTarget::Forward(sinks) => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            Some(sinks)
        }
    };

    let mut child = cmd.spawn().map_err(|source| {
        debug!(script = %spec.program.display(), error = %source, "failed to start provisioning script");
        PcfdevError::Launch {
            path: spec.program.clone(),
            source,
        }
    })?;

    let pid = child.id();
    let target = pid.map(|pid| {
        if spec.own_process_group && cfg!(unix) {
            SignalTarget::Group(pid)
        } else {
            SignalTarget::Process(pid)
        }
    });
    debug!(?target, "provisioning script started");

    let mut pumps = Vec::new();
    if let Some(sinks) = sinks {
        if let Some(stdout) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(stdout, sinks.stdout, "stdout")));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(stderr, sinks.stderr, "stderr")));
        }
    }

    let (done_tx, done_rx) = oneshot::channel();
    let (kill_tx, mut kill_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        // Either the script exits on its own, or the controller asks for it
        // to be killed after the deadline.
        let status = tokio::select! {
            status = child.wait() => status,
            Ok(()) = &mut kill_rx => {
                if let Err(e) = child.start_kill() {
                    warn!(?pid, error = %e, "failed to kill provisioning script");
                }
                child.wait().await
            }
        };

        let status = status.map(ProcessExit::from_status);
        if let Ok(exit) = &status {
            info!(?pid, exit_code = exit.exit_code(), "provisioning script exited");
        }
        let _ = done_tx.send(status);
    });

    Ok(RunningCommand {
        target,
        completion: done_rx,
        kill: Some(kill_tx),
        pumps,
    })
}
