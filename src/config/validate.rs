// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{
    BUILD_PROVISION_SCRIPT, BUILD_TIMEOUT_SECS, DEFAULT_CA_CERT_PATH, DEFAULT_PROVISION_SCRIPT,
    DEFAULT_TIMEOUT_SECS, EnvOverrides, RawConfigFile, SupervisorConfig,
};
use crate::errors::{PcfdevError, Result};

impl RawConfigFile {
    /// Layer runtime environment overrides on top of file values.
    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) -> Result<()> {
        if let Some(ref script) = overrides.provision_script {
            self.provision_script = Some(PathBuf::from(script));
        }
        if let Some(ref secs) = overrides.timeout_secs {
            self.timeout_secs = Some(parse_timeout_secs(EnvOverrides::TIMEOUT_SECS_VAR, secs)?);
        }
        Ok(())
    }
}

impl TryFrom<RawConfigFile> for SupervisorConfig {
    type Error = PcfdevError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let provision_script = raw
            .provision_script
            .unwrap_or_else(|| PathBuf::from(BUILD_PROVISION_SCRIPT.unwrap_or(DEFAULT_PROVISION_SCRIPT)));

        let timeout_secs = match raw.timeout_secs {
            Some(secs) => secs,
            None => build_default_timeout_secs()?,
        };

        let config = SupervisorConfig {
            provision_script,
            timeout_secs,
            on_timeout: raw.on_timeout.unwrap_or_default(),
            working_dir: raw.working_dir,
            env: raw.env,
            ca_cert_path: raw
                .ca_cert_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CA_CERT_PATH)),
            verify_ca_cert: raw.verify_ca_cert.unwrap_or(true),
        };

        validate_config(&config)?;
        Ok(config)
    }
}

fn validate_config(cfg: &SupervisorConfig) -> Result<()> {
    if cfg.provision_script.as_os_str().is_empty() {
        return Err(PcfdevError::ConfigError(
            "provision_script must not be empty".to_string(),
        ));
    }

    if let Some(ref dir) = cfg.working_dir {
        if dir.as_os_str().is_empty() {
            return Err(PcfdevError::ConfigError(
                "working_dir must not be empty when set".to_string(),
            ));
        }
    }

    if let Some(key) = cfg.env.keys().find(|k| k.is_empty() || k.contains('=')) {
        return Err(PcfdevError::ConfigError(format!(
            "invalid environment variable name '{key}' in [env]"
        )));
    }

    // A zero timeout is allowed on purpose: it forces the timeout path.
    Ok(())
}

fn build_default_timeout_secs() -> Result<u64> {
    match BUILD_TIMEOUT_SECS {
        Some(secs) => parse_timeout_secs("build-time PCFDEV_TIMEOUT_SECS", secs),
        None => Ok(DEFAULT_TIMEOUT_SECS),
    }
}

fn parse_timeout_secs(source: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        PcfdevError::ConfigError(format!(
            "{source} must be a whole number of seconds (got '{value}')"
        ))
    })
}
