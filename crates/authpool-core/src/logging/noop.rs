//! Silent logger for tests and embedding

use super::traits::Logger;

/// A logger that discards all messages
///
/// Used as the default logger when a component is constructed without one,
/// and in tests where log output is noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
