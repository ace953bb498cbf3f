//! Driver-level error types (spec §4.6): `thiserror` for the structured
//! leaf enum, built directly on `xcc-util`'s `Handler`/`Diagnostic` stack
//! for the per-compilation collection underneath it.

use std::path::PathBuf;
use thiserror::Error;
use xcc_util::Handler;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("IO error for {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("compilation failed:\n{0}")]
    CompilationFailed(CompileReport),
}

/// Aggregated per-compilation report (spec §7: "The driver aggregates
/// phase-level errors into a per-compilation message and count"). Each
/// phase still only latches its own single most-recent error; this collects
/// whichever of those fired into the `Handler` every phase feeds into, one
/// [`xcc_util::Diagnostic`] per phase, for human-readable reporting.
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    handler: Handler,
}

impl CompileReport {
    pub fn push(&mut self, msg: impl Into<String>) {
        self.handler.error(msg);
    }

    pub fn is_empty(&self) -> bool {
        !self.handler.has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.handler.error_count()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.handler.diagnostics().iter().map(|d| d.message.as_str())
    }
}

impl std::fmt::Display for CompileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for msg in self.messages() {
            writeln!(f, "{}", msg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_empty_and_has_no_errors() {
        let report = CompileReport::default();
        assert!(report.is_empty());
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn pushed_messages_are_latched_as_handler_errors() {
        let mut report = CompileReport::default();
        report.push("undefined identifier 'x'");
        report.push("undefined function 'g'");
        assert!(!report.is_empty());
        assert_eq!(report.error_count(), 2);
        assert_eq!(
            report.messages().collect::<Vec<_>>(),
            vec!["undefined identifier 'x'", "undefined function 'g'"]
        );
    }

    #[test]
    fn display_renders_one_message_per_line() {
        let mut report = CompileReport::default();
        report.push("first error");
        report.push("second error");
        assert_eq!(report.to_string(), "first error\nsecond error\n");
    }
}
