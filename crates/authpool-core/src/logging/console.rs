//! Logger backed by the process output streams
//!
//! Rotation and issuance events (`info`) go to stdout; diagnostics (`debug`,
//! `warn`, `error`) go to stderr, so a host tailing request flow is not
//! drowned in cache-hit chatter.

use super::traits::Logger;

/// Writes prefixed, level-tagged lines to stdout/stderr
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    /// Logger with the `[AuthPool]` prefix
    pub fn new() -> Self {
        Self::with_prefix("[AuthPool]")
    }

    /// Logger with a host-chosen prefix, e.g. a deployment or pool name
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn line(&self, level: &str, message: &str) -> String {
        format!("{} {level}: {message}", self.prefix)
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        eprintln!("{}", self.line("DEBUG", message));
    }

    fn info(&self, message: &str) {
        println!("{}", self.line("INFO", message));
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", self.line("WARN", message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", self.line("ERROR", message));
    }
}
