#![allow(dead_code)]

use std::path::Path;

use pcfdev::config::{RawConfigFile, SupervisorConfig};
use pcfdev::types::TimeoutPolicy;

/// Builder for `SupervisorConfig` to simplify test setup.
///
/// Defaults to a 30 second timeout and no CA certificate check, so tests
/// only see the behaviour they set up.
pub struct SupervisorConfigBuilder {
    config: RawConfigFile,
}

impl SupervisorConfigBuilder {
    pub fn new(script: &Path) -> Self {
        Self {
            config: RawConfigFile {
                provision_script: Some(script.to_path_buf()),
                timeout_secs: Some(30),
                verify_ca_cert: Some(false),
                ..Default::default()
            },
        }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn on_timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.config.on_timeout = Some(policy);
        self
    }

    pub fn working_dir(mut self, dir: &Path) -> Self {
        self.config.working_dir = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn ca_cert(mut self, path: &Path) -> Self {
        self.config.ca_cert_path = Some(path.to_path_buf());
        self.config.verify_ca_cert = Some(true);
        self
    }

    pub fn build(self) -> SupervisorConfig {
        SupervisorConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
