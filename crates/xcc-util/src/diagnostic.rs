//! Structured diagnostic collection.
//!
//! Each compiler phase (lexer, parser, symbol table, emitter) latches only
//! its own single most-recent error, exactly as spec'd — that plain
//! `Option<String>` + `bool` contract is what the Testable Properties and
//! the CLI's exit code depend on, and is implemented directly on each
//! phase's own struct rather than routed through here.
//!
//! [`Handler`] sits one layer up, in the driver: `xcc-drv`'s `CompileReport`
//! (`crates/xcc-drv/src/error.rs`) is backed directly by one, and *collects*
//! every diagnostic emitted across a whole compilation (errors and warnings
//! alike) for human-readable reporting, without itself changing whether a
//! phase's latched boolean says the compilation succeeded.

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Option<Span>,
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into(), span: None, note: None }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: Level::Warning, message: message.into(), span: None, note: None }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Accumulates diagnostics for one compilation.
#[derive(Debug, Clone, Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self { diagnostics: Vec::new() }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.emit(Diagnostic::error(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.emit(Diagnostic::warning(message));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.level == Level::Warning).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handler_has_no_errors() {
        let h = Handler::new();
        assert!(!h.has_errors());
        assert_eq!(h.error_count(), 0);
    }

    #[test]
    fn error_and_warning_counts_are_independent() {
        let mut h = Handler::new();
        h.error("bad thing");
        h.warning("heads up");
        h.warning("heads up again");
        assert!(h.has_errors());
        assert_eq!(h.error_count(), 1);
        assert_eq!(h.warning_count(), 2);
    }

    #[test]
    fn builder_methods_attach_span_and_note() {
        let d = Diagnostic::error("oops").with_span(Span::new(1, 1)).with_note("try this");
        assert_eq!(d.span, Some(Span::new(1, 1)));
        assert_eq!(d.note.as_deref(), Some("try this"));
    }
}
