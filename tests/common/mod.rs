#![allow(dead_code)]

pub use pcfdev_test_utils::builders::SupervisorConfigBuilder;
pub use pcfdev_test_utils::capture::{CapturedOutput, capture};
pub use pcfdev_test_utils::scripts::TestScript;
pub use pcfdev_test_utils::{init_tracing, with_timeout};
