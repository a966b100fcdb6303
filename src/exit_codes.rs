//! Stable exit codes for the `pcfdev` binary.
//!
//! A completed provisioning script's own exit code is passed through
//! verbatim, so only [`OK`] and [`TIMED_OUT`] are produced by the
//! supervisor itself. The remaining codes are reserved for failures of the
//! tool and mirror `timeout(1)`.

/// Provisioning script completed successfully.
pub const OK: i32 = 0;
/// Provisioning script did not finish before the deadline.
pub const TIMED_OUT: i32 = 1;
/// The tool itself failed (bad configuration, lost track of the child).
pub const SUPERVISOR_FAILED: i32 = 125;
/// The provisioning script exists but could not be invoked.
pub const CANNOT_EXECUTE: i32 = 126;
/// The provisioning script does not exist.
pub const SCRIPT_NOT_FOUND: i32 = 127;
