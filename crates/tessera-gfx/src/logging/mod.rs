//! Logger initialization for binaries.
//!
//! The library itself only emits through the `log` facade and never installs
//! a backend.

mod init;

pub use init::{init_logging, LoggingConfig};
