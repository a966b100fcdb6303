// src/supervisor/policy.rs

//! Exit-code policy: how a run's outcome becomes the tool's exit behaviour.
//!
//! | Outcome          | Message                       | Exit code |
//! |------------------|-------------------------------|-----------|
//! | `Completed(0)`   | none                          | 0         |
//! | `Completed(n)`   | none                          | n         |
//! | `TimedOut`       | `Timed out after N seconds.`  | 1         |
//!
//! A script's own exit code is meaningful to whoever called the tool, so it
//! passes through untouched. A timeout has no script exit code and gets the
//! reserved code instead.

use crate::exit_codes;
use crate::types::RunOutcome;

/// Final decision for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub exit_code: i32,
    /// Line printed after the script's own output, if any.
    pub message: Option<String>,
}

impl Verdict {
    pub fn succeeded(&self) -> bool {
        self.exit_code == exit_codes::OK
    }
}

pub fn decide(outcome: RunOutcome, timeout_secs: u64) -> Verdict {
    match outcome {
        RunOutcome::Completed(code) => Verdict {
            exit_code: code,
            message: None,
        },
        RunOutcome::TimedOut => Verdict {
            exit_code: exit_codes::TIMED_OUT,
            message: Some(timeout_message(timeout_secs)),
        },
    }
}

pub fn timeout_message(timeout_secs: u64) -> String {
    format!("Timed out after {timeout_secs} seconds.")
}
