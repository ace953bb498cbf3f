//! Recursive-descent parser for the Xinu C dialect: turns a [`xcc_lex::Lexer`]
//! token stream into a [`ast::Program`] with full C-style operator
//! precedence (spec §4.2).

pub mod ast;
pub mod parser;
pub mod types;

pub use ast::*;
pub use parser::Parser;
pub use types::{BaseKind, Qualifiers, Type, MAX_ARRAY_DIMS};
