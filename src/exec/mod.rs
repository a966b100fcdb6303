// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] starts the provisioning script with `tokio::process::Command`
//!   and hands back a [`RunningCommand`] carrying a one-shot completion
//!   signal.
//! - [`output`] copies piped stdout/stderr into caller-supplied sinks when
//!   output is forwarded rather than inherited.
//! - [`deadline`] races the running command against the configured timeout
//!   and produces a [`RunOutcome`](crate::types::RunOutcome).
//! - [`signal`] sends signals to the script's process group (Unix).

pub mod deadline;
pub mod output;
pub mod runner;
pub mod signal;

pub use deadline::DeadlineController;
pub use output::{OutputSinks, OutputTarget};
pub use runner::{CommandSpec, RunningCommand, start};
