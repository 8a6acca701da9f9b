//! Console log

use parking_lot::Mutex;
use spawnforge_core::{Diagnostic, DiagnosticsSink, TracingSink};

/// Line buffer shown by the console
///
/// Also receives assembly diagnostics, which are appended as plain lines
/// and forwarded to `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleLog {
    lines: Mutex<Vec<String>>,
    forward: TracingSink,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line without forwarding it
    pub fn send(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Take all lines, clearing the log
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    /// Whole log, one line per entry
    pub fn text(&self) -> String {
        self.lines.lock().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl DiagnosticsSink for ConsoleLog {
    fn emit(&self, diagnostic: Diagnostic) {
        self.send(diagnostic.message.clone());
        self.forward.emit(diagnostic);
    }
}
