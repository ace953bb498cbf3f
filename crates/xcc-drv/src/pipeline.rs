//! Pipeline orchestration (spec §4.5): lex → parse → symbol-resolution /
//! offset-assignment → code generation → (optionally) assembly emission —
//! no HIR/MIR/LIR/register-allocation/linking stages, those are non-goals
//! here.

use std::fs;
use std::path::Path;

use xcc_gen::{render_assembly, Emitter, Instruction};
use xcc_lex::Lexer;
use xcc_par::Parser;

use crate::config::DumpFlags;
use crate::error::{CompileError, CompileReport};

/// The programmatic entry point (spec §6 "Programmatic"): given a source
/// buffer and a filename, returns the generated instruction stream or an
/// aggregated report of every phase-level error encountered.
pub fn compile(source: &str, filename: &str) -> Result<Vec<Instruction>, CompileReport> {
    let mut report = CompileReport::default();

    let mut lexer = Lexer::new(source, filename);
    let program = {
        let mut parser = Parser::new(&mut lexer);
        let program = parser.parse();
        if lexer.had_error() {
            report.push(lexer.error_message().unwrap_or("lexical error").to_string());
        }
        if parser.had_error() {
            report.push(parser.error_message().unwrap_or("syntax error").to_string());
        }
        program
    };

    if !report.is_empty() {
        return Err(report);
    }

    let mut emitter = Emitter::new(lexer.interner());
    let ok = emitter.generate(&program);
    if !ok {
        if let Some(msg) = emitter.error_message() {
            report.push(msg.to_string());
        }
        return Err(report);
    }

    Ok(emitter.into_instructions())
}

/// Summary of one `compile_file` run — the fields a four-phase compiler
/// actually produces.
pub struct CompilationResults {
    pub instructions: Vec<Instruction>,
    pub dumps: Vec<(&'static str, String)>,
}

/// Reads `in_path`, runs the pipeline, and writes assembly to `out_path`
/// (spec §6 "Programmatic": `compile_file(in, out)`).
pub fn compile_file(
    in_path: &Path,
    out_path: &Path,
    dump: DumpFlags,
) -> Result<CompilationResults, CompileError> {
    let source = fs::read_to_string(in_path)
        .map_err(|e| CompileError::IoError(in_path.to_path_buf(), e))?;
    let filename = in_path.to_string_lossy().into_owned();

    let mut dumps = Vec::new();
    if dump.tokens {
        dumps.push(("tokens", crate::dump::dump_tokens(&source, &filename)));
    }

    let mut lexer = Lexer::new(&source, &filename);
    let program = {
        let mut parser = Parser::new(&mut lexer);
        let program = parser.parse();
        let mut report = CompileReport::default();
        if lexer.had_error() {
            report.push(lexer.error_message().unwrap_or("lexical error").to_string());
        }
        if parser.had_error() {
            report.push(parser.error_message().unwrap_or("syntax error").to_string());
        }
        if !report.is_empty() {
            return Err(CompileError::CompilationFailed(report));
        }
        program
    };
    if dump.ast {
        dumps.push(("ast", crate::dump::dump_ast(&program)));
    }

    let mut emitter = Emitter::new(lexer.interner());
    let ok = emitter.generate(&program);
    if dump.symbols {
        dumps.push(("symbols", crate::dump::dump_symbols(emitter.symbol_table())));
    }
    if !ok {
        let mut report = CompileReport::default();
        if let Some(msg) = emitter.error_message() {
            report.push(msg.to_string());
        }
        return Err(CompileError::CompilationFailed(report));
    }

    let instructions = emitter.into_instructions();
    if dump.code {
        dumps.push(("code", crate::dump::dump_code(&instructions)));
    }

    let assembly = render_assembly(&instructions, &filename);
    fs::write(out_path, assembly).map_err(|e| CompileError::IoError(out_path.to_path_buf(), e))?;

    Ok(CompilationResults { instructions, dumps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcc_gen::Opcode;

    #[test]
    fn compiles_global_assignment_scenario() {
        let instrs = compile("int x; int main() { x = 2 + 3 * 4; return 0; }", "<test>").unwrap();
        assert_eq!(instrs.last().unwrap().opcode, Opcode::Halt);
    }

    #[test]
    fn undefined_callee_is_reported() {
        let err = compile("int f() { return g(); }", "<test>").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn syntax_error_short_circuits_before_codegen() {
        let err = compile("int x = ;", "<test>").unwrap_err();
        assert_eq!(err.error_count(), 1);
    }
}
