use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::config::SupervisorConfig;

static HOSTNAME_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9_])?$")
        .expect("hostname label pattern is a valid regex")
});

const MAX_HOSTNAME_LEN: usize = 253;

/// Hostname the local environment is provisioned for, e.g. `local.pcfdev.io`.
///
/// Labels may contain `_` (as in service records) and a fully qualified name
/// may end in `.`. The name is handed to the script exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostname(String);

impl Hostname {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Hostname {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("hostname must not be empty".to_string());
        }
        let name = s.strip_suffix('.').unwrap_or(s);
        if name.len() > MAX_HOSTNAME_LEN {
            return Err(format!(
                "hostname is {} characters long (maximum {MAX_HOSTNAME_LEN})",
                name.len()
            ));
        }
        if let Some(label) = name.split('.').find(|label| !HOSTNAME_LABEL.is_match(label)) {
            return Err(format!("invalid hostname label '{label}' in '{s}'"));
        }
        Ok(Hostname(s.to_string()))
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to do with a provisioning script that is still running when the
/// deadline elapses.
///
/// - `Kill`: SIGKILL the script's whole process group (default).
/// - `Abandon`: stop waiting and leave the script running on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    #[default]
    Kill,
    Abandon,
}

/// One invocation of the tool: which script to run, for which hostname, and
/// how long to wait for it.
#[derive(Debug, Clone)]
pub struct ProvisionRun {
    hostname: Hostname,
    script: PathBuf,
    timeout_secs: u64,
}

impl ProvisionRun {
    pub fn new(hostname: Hostname, config: &SupervisorConfig) -> Self {
        Self {
            hostname,
            script: config.provision_script.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How a provisioning run ended, as decided by the deadline controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The script exited on its own before the deadline.
    Completed(i32),
    /// The deadline elapsed first.
    TimedOut,
}

/// Terminal status of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    Code(i32),
    /// Killed by the given signal number (Unix only).
    Signal(i32),
}

impl ProcessExit {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ProcessExit::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ProcessExit::Signal(signal);
            }
        }

        ProcessExit::Code(-1)
    }

    /// Exit code to report for this status; signal deaths follow the shell
    /// convention of `128 + signal`.
    pub fn exit_code(self) -> i32 {
        match self {
            ProcessExit::Code(code) => code,
            ProcessExit::Signal(signal) => 128 + signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pcfdev_hostname() {
        let host: Hostname = "local.pcfdev.io".parse().unwrap();
        assert_eq!(host.as_str(), "local.pcfdev.io");
        assert_eq!(host.to_string(), "local.pcfdev.io");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let host: Hostname = "  local.pcfdev.io ".parse().unwrap();
        assert_eq!(host.as_str(), "local.pcfdev.io");
    }

    #[test]
    fn accepts_fully_qualified_and_underscored_names() {
        let fqdn: Hostname = "local.pcfdev.io.".parse().unwrap();
        assert_eq!(fqdn.as_str(), "local.pcfdev.io.");

        let underscored: Hostname = "my_box.pcfdev.io".parse().unwrap();
        assert_eq!(underscored.as_str(), "my_box.pcfdev.io");
    }

    #[test]
    fn rejects_empty_and_malformed_hostnames() {
        assert!("".parse::<Hostname>().is_err());
        assert!(".".parse::<Hostname>().is_err());
        assert!("local.pcfdev.io..".parse::<Hostname>().is_err());
        assert!("local..pcfdev.io".parse::<Hostname>().is_err());
        assert!("-local.pcfdev.io".parse::<Hostname>().is_err());
        assert!("local.pcfdev.io-".parse::<Hostname>().is_err());
        assert!("local pcfdev".parse::<Hostname>().is_err());
        assert!("local.pcfdev.io; rm -rf /".parse::<Hostname>().is_err());
    }

    #[test]
    fn rejects_overlong_label() {
        let label = "a".repeat(64);
        let err = format!("{label}.pcfdev.io").parse::<Hostname>().unwrap_err();
        assert!(err.contains("invalid hostname label"), "{err}");
    }

    #[test]
    fn signal_deaths_use_shell_convention() {
        assert_eq!(ProcessExit::Code(42).exit_code(), 42);
        assert_eq!(ProcessExit::Signal(9).exit_code(), 137);
    }

    #[cfg(unix)]
    #[test]
    fn from_status_distinguishes_code_and_signal() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait statuses: exit code lives in the high byte, signal in the low bits.
        assert_eq!(
            ProcessExit::from_status(ExitStatus::from_raw(42 << 8)),
            ProcessExit::Code(42)
        );
        assert_eq!(
            ProcessExit::from_status(ExitStatus::from_raw(15)),
            ProcessExit::Signal(15)
        );
    }
}
