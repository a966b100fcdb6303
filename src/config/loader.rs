// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{EnvOverrides, RawConfigFile, SupervisorConfig};
use crate::errors::Result;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_PATH_VAR: &str = "PCFDEV_CONFIG";

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; defaults and validation are
/// applied by [`load_and_validate`] / [`resolve`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and turn it into a validated config, ignoring
/// environment overrides.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SupervisorConfig> {
    let raw = load_from_path(path)?;
    SupervisorConfig::try_from(raw)
}

/// Resolve the configuration for this invocation from the real process
/// environment.
pub fn resolve(cli_path: Option<&Path>) -> Result<SupervisorConfig> {
    resolve_with(cli_path, |key| std::env::var(key).ok())
}

/// Resolve the configuration with an explicit environment lookup.
///
/// - `cli_path` wins over `PCFDEV_CONFIG`; with neither, no file is read.
/// - `PCFDEV_PROVISION_SCRIPT` / `PCFDEV_TIMEOUT_SECS` override the file.
pub fn resolve_with(
    cli_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SupervisorConfig> {
    let file_path: Option<PathBuf> = cli_path
        .map(Path::to_path_buf)
        .or_else(|| lookup(CONFIG_PATH_VAR).filter(|p| !p.is_empty()).map(PathBuf::from));

    let mut raw = match file_path {
        Some(ref path) => {
            debug!(path = %path.display(), "loading config file");
            load_from_path(path)?
        }
        None => RawConfigFile::default(),
    };

    let overrides = EnvOverrides::from_lookup(lookup);
    raw.apply_overrides(&overrides)?;

    SupervisorConfig::try_from(raw)
}
