//! Human-readable assembly writer (spec §6 "Output file format").
//!
//! The distilled spec treats this writer as trivial and out of core scope,
//! but SPEC_FULL.md brings it in as a concrete, pinned-format module: a
//! compiler is not observable end-to-end without somewhere to write its
//! output.

use crate::opcode::Instruction;
use std::io::{self, Write};

/// Product name stamped into the header's first comment line.
pub const PRODUCT_NAME: &str = "xcc";

/// Writes the pinned textual assembly format: three `;`-prefixed header
/// comments (product, source filename, compiler version), a blank line,
/// then one line per instruction — an optional `label:` line, two leading
/// spaces, the mnemonic left-justified to width 10, a space, and the
/// decimal operand.
pub fn write_assembly(
    out: &mut impl Write,
    instructions: &[Instruction],
    source_filename: &str,
) -> io::Result<()> {
    writeln!(out, "; {}", PRODUCT_NAME)?;
    writeln!(out, "; {}", source_filename)?;
    writeln!(out, "; {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    for inst in instructions {
        if let Some(label) = &inst.label {
            writeln!(out, "{}:", label)?;
        }
        write!(out, "  {:<10} {}", inst.opcode.mnemonic(), inst.operand)?;
        if let Some(comment) = &inst.comment {
            write!(out, " ; {}", comment)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Renders to an owned `String`, for dump modes and tests that don't need a
/// file handle.
pub fn render_assembly(instructions: &[Instruction], source_filename: &str) -> String {
    let mut buf = Vec::new();
    write_assembly(&mut buf, instructions, source_filename).expect("writing to a Vec never fails");
    String::from_utf8(buf).expect("assembly output is always valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn header_has_three_comment_lines_then_a_blank_line() {
        let text = render_assembly(&[], "foo.xc");
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with(';'));
        assert!(lines[1].starts_with(';'));
        assert!(lines[2].starts_with(';'));
        assert_eq!(lines[3], "");
    }

    #[test]
    fn instruction_line_has_two_space_indent_and_padded_mnemonic() {
        let text = render_assembly(&[Instruction::new(Opcode::Push, 7)], "foo.xc");
        let inst_line = text.lines().nth(4).unwrap();
        assert_eq!(inst_line, "  PUSH       7");
    }

    #[test]
    fn labelled_instruction_emits_label_line_first() {
        let text = render_assembly(&[Instruction::new(Opcode::Nop, 0).with_label("func_main")], "f.xc");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[4], "func_main:");
        assert!(lines[5].starts_with("  NOP"));
    }
}
