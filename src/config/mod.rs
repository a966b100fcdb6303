// src/config/mod.rs

//! Supervisor configuration.
//!
//! Values are resolved once at startup, in increasing priority:
//! 1. build-time defaults (`PCFDEV_PROVISION_SCRIPT` / `PCFDEV_TIMEOUT_SECS`
//!    set in the environment of `cargo build`)
//! 2. a TOML file (`--config` or `PCFDEV_CONFIG`)
//! 3. the same two variables set in the environment at runtime
//!
//! The result is an immutable [`SupervisorConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve, resolve_with};
pub use model::{EnvOverrides, RawConfigFile, SupervisorConfig};
