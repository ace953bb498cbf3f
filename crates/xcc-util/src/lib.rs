//! Shared infrastructure for the compiler's phases: typed-index arenas,
//! source spans, identifier interning, and diagnostic collection.
//!
//! None of this is compiler *logic* — it's the ambient plumbing every phase
//! in `xcc-lex`/`xcc-par`/`xcc-sem`/`xcc-gen`/`xcc-drv` builds on.

pub mod diagnostic;
pub mod index;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index::{Idx, IndexVec};
pub use span::{FileId, Span};
pub use symbol::{Symbol, SymbolInterner};
