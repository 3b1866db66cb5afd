//! Diagnostics sinks.
//!
//! Index construction reports what it kept (classes per supercategory, total
//! images) through a [`DiagnosticsSink`] handed in by the caller instead of
//! reaching for a process-wide logger.

use std::sync::Mutex;

/// Receives human-readable diagnostic lines.
pub trait DiagnosticsSink: Send + Sync {
    /// Records an informational line.
    fn info(&self, message: &str);

    /// Records a low-level detail line. Ignored unless overridden.
    fn debug(&self, _message: &str) {}

    /// Whether [`debug`](Self::debug) lines are kept. Callers check this
    /// before formatting a debug line.
    fn debug_enabled(&self) -> bool {
        false
    }
}

/// Forwards diagnostics to the `log` facade under the `inatindex` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn info(&self, message: &str) {
        log::info!(target: "inatindex", "{message}");
    }

    fn debug(&self, message: &str) {
        log::debug!(target: "inatindex", "{message}");
    }

    fn debug_enabled(&self) -> bool {
        log::log_enabled!(target: "inatindex", log::Level::Debug)
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn info(&self, _message: &str) {}
}

/// Collects info lines in memory, mostly for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticsSink for MemorySink {
    fn info(&self, message: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(message.to_string());
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &S {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn debug_enabled(&self) -> bool {
        (**self).debug_enabled()
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for std::sync::Arc<S> {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn debug_enabled(&self) -> bool {
        (**self).debug_enabled()
    }
}
