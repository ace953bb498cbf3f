//! Symbol table entries (spec §3 "Symbol").

use xcc_par::Type;
use xcc_util::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Process,
    Semaphore,
    Struct,
    Union,
    Enum,
    Typedef,
    Label,
}

impl SymbolKind {
    /// Spec §4.3: "if kind ∈ {variable, parameter}, the scope advances
    /// `next_offset` by size(type)." Every other kind records the current
    /// cursor without consuming storage.
    pub fn consumes_offset(self) -> bool {
        matches!(self, SymbolKind::Variable | SymbolKind::Parameter)
    }
}

/// A declared name. Exclusively owned by the [`crate::scope::Scope`] that
/// inserted it (spec §3) — in this reimplementation that ownership is plain
/// `Vec<SymbolEntry>` storage, dropped along with the scope.
///
/// The declaring AST node is represented by its [`Span`] rather than an
/// actual back-reference: spec §9's Design Notes call for non-owning
/// handles over reference cycles, and a span is enough to report "declared
/// here" without the AST needing to outlive the symbol table.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    /// Bounded to 256 bytes per spec §3, as with [`xcc_lex::Token::spelling`].
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub scope_level: u32,
    pub offset: i32,
    pub initialized: bool,
    pub used: bool,
    pub declared_at: Span,
}

impl SymbolEntry {
    pub fn is_global(&self) -> bool {
        self.scope_level == 0
    }
}
