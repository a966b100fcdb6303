// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::Hostname;

/// Command-line arguments for `pcfdev`.
///
/// The provisioning script and its timeout are configuration, not flags: see
/// `--config` and the `PCFDEV_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pcfdev",
    version,
    about = "Provision a local PCF Dev environment and wait for it to come up.",
    long_about = None
)]
pub struct CliArgs {
    /// Hostname to provision for, e.g. `local.pcfdev.io`.
    #[arg(value_name = "HOSTNAME")]
    pub hostname: Hostname,

    /// Path to a TOML config file.
    ///
    /// If omitted, `PCFDEV_CONFIG` is used; with neither, built-in defaults
    /// apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PCFDEV_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
