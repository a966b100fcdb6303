// src/errors.rs

//! Crate-wide error type and result alias.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug)]
pub enum PcfdevError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The provisioning script could not be started at all.
    ///
    /// This is distinct from the script running and exiting non-zero, which
    /// is a normal outcome and never surfaces as an error.
    #[error("cannot start provisioning script '{}': {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PcfdevError {
    /// Exit code the tool reports when it fails with this error.
    ///
    /// These codes are reserved for tool-level failures and follow the
    /// `timeout(1)` convention; see [`exit_codes`].
    pub fn exit_code(&self) -> i32 {
        match self {
            PcfdevError::Launch { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                exit_codes::SCRIPT_NOT_FOUND
            }
            PcfdevError::Launch { .. } => exit_codes::CANNOT_EXECUTE,
            PcfdevError::ConfigError(_)
            | PcfdevError::IoError(_)
            | PcfdevError::TomlError(_)
            | PcfdevError::Other(_) => exit_codes::SUPERVISOR_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, PcfdevError>;
