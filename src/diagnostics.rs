//! Logging capability threaded through extraction.
//!
//! Core code never calls `tracing` directly. Assemblers receive a
//! `&dyn Diagnostics` and report recovered failures through it; the CLI
//! installs the subscriber once at start-up.

use std::cell::RefCell;

use crate::error::ExtractionWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// Minimal sink for non-fatal diagnostic events.
pub trait Diagnostics {
    fn warn(&self, message: &str);

    fn info(&self, _message: &str) {}

    /// Report a recovered extraction failure.
    fn recovered(&self, warning: &ExtractionWarning) {
        self.warn(&warning.to_string());
    }
}

/// Forwards events to the process-wide `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    events: RefCell<Vec<(Severity, String)>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Severity, String)> {
        self.events.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(severity, _)| *severity == Severity::Warning)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn warn(&self, message: &str) {
        self.events
            .borrow_mut()
            .push((Severity::Warning, message.to_string()));
    }

    fn info(&self, message: &str) {
        self.events
            .borrow_mut()
            .push((Severity::Info, message.to_string()));
    }
}

/// Install the fmt subscriber. `SHEETLENS_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("SHEETLENS_LOG")
        .unwrap_or_else(|_| default_filter.into());

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collected_keeps_order_and_severity() {
        let diagnostics = CollectedDiagnostics::new();
        diagnostics.info("opening");
        diagnostics.warn("chart skipped");
        diagnostics.recovered(&ExtractionWarning::new("image 1", "empty payload"));

        let events = diagnostics.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], (Severity::Info, "opening".to_string()));
        assert_eq!(
            diagnostics.warnings(),
            vec!["chart skipped".to_string(), "image 1: empty payload".to_string()]
        );
    }
}
