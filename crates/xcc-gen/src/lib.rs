//! AST-walking code emitter: lowers a parsed [`xcc_par::Program`] to a flat
//! stack-machine [`opcode::Instruction`] stream (spec §4.4), plus the
//! pinned textual assembly writer (spec §6) that renders that stream to the
//! documented output format.

pub mod asm;
pub mod emitter;
pub mod opcode;

pub use asm::{render_assembly, write_assembly, PRODUCT_NAME};
pub use emitter::Emitter;
pub use opcode::{Instruction, Opcode};
