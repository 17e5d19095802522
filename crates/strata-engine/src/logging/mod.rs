//! Logger setup.
//!
//! The crate itself only emits through the `log` facade; this is a convenience
//! for binaries and tests that want `env_logger` wired up.

mod init;

pub use init::{LoggingConfig, init_logging};
