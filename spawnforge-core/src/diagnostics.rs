//! Diagnostics reporting
//!
//! Every outcome of an assembly (success, skip, failure) is surfaced as a
//! human-readable line on a [`DiagnosticsSink`]. Sinks are one-way and
//! must never fail back into the scheduler.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use spawnforge_types::{InstanceId, Severity};
use std::fmt;
use std::sync::Arc;

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub instance: Option<InstanceId>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            instance: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_instance(mut self, instance: InstanceId) -> Self {
        self.instance = Some(instance);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Receiver of diagnostic messages
pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<S> {
    fn emit(&self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic)
    }
}

/// Sink that forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let instance = diagnostic.instance.map(|i| i.as_u64());
        match diagnostic.severity {
            Severity::Error => tracing::error!(instance, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(instance, "{}", diagnostic.message),
            Severity::Info => tracing::info!(instance, "{}", diagnostic.message),
        }
    }
}

/// In-memory sink that keeps diagnostics in emission order
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every diagnostic emitted so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Messages in emission order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    /// Take all diagnostics, clearing the log
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of messages containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.message.contains(needle))
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticsSink for DiagnosticLog {
    fn emit(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}

/// Sink that forwards every diagnostic to several sinks
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticsSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl DiagnosticsSink for FanoutSink {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(diagnostic.clone());
            }
            last.emit(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("slot 1 is empty");
        assert_eq!(diag.to_string(), "[warning] slot 1 is empty");
        assert!(diag.instance.is_none());
    }

    #[test]
    fn test_log_collects_in_order() {
        let log = DiagnosticLog::new();
        log.emit(Diagnostic::info("first"));
        log.emit(Diagnostic::error("second"));

        assert_eq!(log.messages(), vec!["first", "second"]);
        assert!(log.has_errors());
        assert_eq!(log.count_containing("sec"), 1);

        let taken = log.take();
        assert_eq!(taken.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Arc::new(DiagnosticLog::new());
        let b = Arc::new(DiagnosticLog::new());
        let fanout = FanoutSink::new()
            .with(a.clone())
            .with(b.clone())
            .with(Arc::new(TracingSink));

        fanout.emit(Diagnostic::info("hello"));

        assert_eq!(a.messages(), vec!["hello"]);
        assert_eq!(b.messages(), vec!["hello"]);
    }
}
