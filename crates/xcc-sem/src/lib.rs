//! Lexically scoped symbol table: nested scopes, djb2-hashed lookup, and
//! storage-offset assignment (spec §4.3). Consumed by `xcc-gen`, whose
//! emitter drives scope entry/exit as it walks the AST in the same pass
//! that generates code — this crate only owns the table's own invariants.

pub mod scope;
pub mod symbol;

pub use scope::SymbolTable;
pub use symbol::{SymbolEntry, SymbolKind};
