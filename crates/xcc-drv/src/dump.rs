//! Human-readable dumps for `-dump-tokens`/`-dump-ast`/`-dump-symbols`/
//! `-dump-code` (spec §6). Each dump is read-only over a fresh pass through
//! the relevant phase rather than a shared cache, since a dump is a
//! diagnostic side channel, not something downstream phases consume.

use std::fmt::Write as _;

use xcc_gen::Instruction;
use xcc_lex::Lexer;
use xcc_par::{Parser, Program};
use xcc_sem::SymbolTable;

pub fn dump_tokens(source: &str, filename: &str) -> String {
    let mut lexer = Lexer::new(source, filename);
    let mut out = String::new();
    loop {
        let tok = lexer.next_token();
        let done = tok.kind == xcc_lex::TokenKind::Eof;
        let _ = writeln!(out, "{:?} {:?} {}:{}", tok.kind, tok.literal, tok.span.line, tok.span.column);
        if done {
            break;
        }
    }
    out
}

pub fn dump_ast(program: &Program) -> String {
    format!("{:#?}", program)
}

pub fn dump_symbols(symtab: &SymbolTable) -> String {
    let mut out = String::new();
    for scope in symtab.scopes() {
        let _ = writeln!(out, "scope level {}:", scope.level);
        for sym in scope.symbols() {
            let _ = writeln!(
                out,
                "  {} : {:?} @ offset {} (kind {:?})",
                sym.name, sym.ty.base, sym.offset, sym.kind
            );
        }
    }
    out
}

pub fn dump_code(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for (idx, inst) in instructions.iter().enumerate() {
        if let Some(label) = &inst.label {
            let _ = writeln!(out, "{}:", label);
        }
        let _ = writeln!(out, "{:4}: {:<10} {}", idx, inst.opcode.mnemonic(), inst.operand);
    }
    out
}
