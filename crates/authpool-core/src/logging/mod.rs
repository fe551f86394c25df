//! Runtime-agnostic logging
//!
//! The core never writes to stdout/stderr on its own; every stateful
//! component takes a [`SharedLogger`] and the host decides where output goes.

mod console;
mod noop;
mod traits;

pub use console::ConsoleLogger;
pub use noop::NoOpLogger;
pub use traits::{Logger, SharedLogger};

use std::sync::Arc;

/// Convenience constructor for a silent logger
pub fn noop_logger() -> SharedLogger {
    Arc::new(NoOpLogger)
}

/// Convenience constructor for a console logger with the default prefix
pub fn console_logger() -> SharedLogger {
    Arc::new(ConsoleLogger::new())
}
