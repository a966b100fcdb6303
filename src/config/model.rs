// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::TimeoutPolicy;

/// Script path baked in at build time, if any.
pub const BUILD_PROVISION_SCRIPT: Option<&str> = option_env!("PCFDEV_PROVISION_SCRIPT");

/// Timeout (seconds) baked in at build time, if any.
pub const BUILD_TIMEOUT_SECS: Option<&str> = option_env!("PCFDEV_TIMEOUT_SECS");

pub const DEFAULT_PROVISION_SCRIPT: &str = "/var/pcfdev/provision-script";
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_CA_CERT_PATH: &str = "/var/pcfdev/openssl/ca_cert.pem";

/// Configuration as read from a TOML file.
///
/// ```toml
/// provision_script = "/var/pcfdev/provision-script"
/// timeout_secs = 3600
/// on_timeout = "kill"
/// working_dir = "/var/pcfdev"
/// ca_cert_path = "/var/pcfdev/openssl/ca_cert.pem"
/// verify_ca_cert = true
///
/// [env]
/// PCFDEV_DOMAIN = "local.pcfdev.io"
/// ```
///
/// Every key is optional; missing keys fall back to build-time defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub provision_script: Option<PathBuf>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub on_timeout: Option<TimeoutPolicy>,

    /// Working directory for the script; inherited when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables for the script, on top of the inherited
    /// environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,

    #[serde(default)]
    pub verify_ca_cert: Option<bool>,
}

/// Runtime overrides read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub provision_script: Option<String>,
    pub timeout_secs: Option<String>,
}

impl EnvOverrides {
    pub const PROVISION_SCRIPT_VAR: &'static str = "PCFDEV_PROVISION_SCRIPT";
    pub const TIMEOUT_SECS_VAR: &'static str = "PCFDEV_TIMEOUT_SECS";

    /// Build overrides from an arbitrary lookup (tests use a map instead of
    /// the real environment). Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            provision_script: get(Self::PROVISION_SCRIPT_VAR),
            timeout_secs: get(Self::TIMEOUT_SECS_VAR),
        }
    }
}

/// Validated, immutable configuration handed to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub provision_script: PathBuf,
    pub timeout_secs: u64,
    pub on_timeout: TimeoutPolicy,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub ca_cert_path: PathBuf,
    pub verify_ca_cert: bool,
}
