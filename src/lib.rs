// src/lib.rs

pub mod certs;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod exit_codes;
pub mod logging;
pub mod supervisor;
pub mod types;

use tracing::debug;

use crate::cli::CliArgs;
use crate::errors::Result;
use crate::exec::OutputTarget;
use crate::supervisor::Supervisor;

/// High-level entry point used by `main.rs`.
///
/// Resolves configuration, runs the provisioning script with inherited
/// stdout/stderr, prints the final message (if any) after the script's own
/// output, and returns the exit code the tool should use.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = config::resolve(args.config.as_deref())?;
    debug!(?config, "resolved configuration");

    let supervisor = Supervisor::new(config)
        .with_interrupt_forwarding(true)
        .with_foreground_terminal(exec::signal::in_foreground_terminal());
    let run = supervisor.provision_run(args.hostname);

    let verdict = supervisor.supervise(&run, OutputTarget::Inherit).await?;
    if let Some(ref message) = verdict.message {
        println!("{message}");
    }

    Ok(verdict.exit_code)
}
