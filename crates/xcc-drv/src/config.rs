//! CLI configuration (spec §4.7 / §6).
//!
//! Spec §6 pins the entire flag surface, so `Config` holds exactly those
//! fields — no TOML/env layer is invented on top, since the CLI already *is*
//! the complete configuration surface for this compiler.

use std::path::PathBuf;
use thiserror::Error;

/// A single dump-mode request (`-dump-tokens`, `-dump-ast`, `-dump-symbols`,
/// `-dump-code`), any combination of which may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpFlags {
    pub tokens: bool,
    pub ast: bool,
    pub symbols: bool,
    pub code: bool,
}

impl DumpFlags {
    pub fn any(self) -> bool {
        self.tokens || self.ast || self.symbols || self.code
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dump: DumpFlags,
    /// `-O`: accepted for forward compatibility, has no effect (spec §6 /
    /// §1 Non-goals: "no optimiser").
    pub optimize: bool,
    /// `-W<n>`, clamped to 0–3 (spec §6).
    pub warning_level: u8,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no input file given")]
    MissingInput,
    #[error("unrecognized option '{0}'")]
    UnknownFlag(String),
    #[error("option '{0}' requires an argument")]
    MissingArgument(String),
    #[error("invalid warning level '{0}', expected 0-3")]
    InvalidWarningLevel(String),
}

/// What a successful CLI parse wants to happen next, beyond compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Compile,
    Help,
    Version,
}

pub struct ParsedArgs {
    pub action: Action,
    pub config: Config,
}

/// Hand-rolled flag loop (spec §4.5) over a declarative arg-parsing crate —
/// the flag set here is small and fixed.
pub fn parse_args(args: &[String]) -> Result<ParsedArgs, CliError> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut dump = DumpFlags::default();
    let mut optimize = false;
    let mut warning_level: u8 = 0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(ParsedArgs { action: Action::Help, config: default_config() }),
            "-v" | "--version" => {
                return Ok(ParsedArgs { action: Action::Version, config: default_config() })
            }
            "-o" => {
                let path = iter.next().ok_or_else(|| CliError::MissingArgument("-o".to_string()))?;
                output = Some(PathBuf::from(path));
            }
            "-dump-tokens" => dump.tokens = true,
            "-dump-ast" => dump.ast = true,
            "-dump-symbols" => dump.symbols = true,
            "-dump-code" => dump.code = true,
            "-O" => optimize = true,
            other if other.starts_with("-W") => {
                let digits = &other[2..];
                let level: u8 = digits
                    .parse()
                    .map_err(|_| CliError::InvalidWarningLevel(digits.to_string()))?;
                if level > 3 {
                    return Err(CliError::InvalidWarningLevel(digits.to_string()));
                }
                warning_level = level;
            }
            other if other.starts_with('-') => return Err(CliError::UnknownFlag(other.to_string())),
            other => input = Some(PathBuf::from(other)),
        }
    }

    let input = input.ok_or(CliError::MissingInput)?;
    let output = output.unwrap_or_else(|| PathBuf::from("out.xc"));
    Ok(ParsedArgs {
        action: Action::Compile,
        config: Config { input, output, dump, optimize, warning_level },
    })
}

fn default_config() -> Config {
    Config {
        input: PathBuf::new(),
        output: PathBuf::from("out.xc"),
        dump: DumpFlags::default(),
        optimize: false,
        warning_level: 0,
    }
}

pub const HELP_TEXT: &str = "\
xcc - Xinu C dialect stack-machine compiler

USAGE:
    xcc [OPTIONS] <input>

OPTIONS:
    -o <file>        Output path (default: out.xc)
    -dump-tokens     Dump the lexer's token stream
    -dump-ast        Dump the parsed AST
    -dump-symbols    Dump the symbol table
    -dump-code       Dump the generated instructions
    -O               Reserved for optimization (currently a no-op)
    -W<n>            Warning level 0-3
    -h, --help       Print this help and exit
    -v, --version    Print version and exit
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_an_error() {
        let err = parse_args(&[]).unwrap_err();
        assert!(matches!(err, CliError::MissingInput));
    }

    #[test]
    fn output_flag_overrides_default() {
        let args = vec!["foo.xc".to_string(), "-o".to_string(), "bar.out".to_string()];
        let parsed = parse_args(&args).unwrap();
        assert_eq!(parsed.config.output, PathBuf::from("bar.out"));
    }

    #[test]
    fn default_output_is_out_xc() {
        let args = vec!["foo.xc".to_string()];
        let parsed = parse_args(&args).unwrap();
        assert_eq!(parsed.config.output, PathBuf::from("out.xc"));
    }

    #[test]
    fn dump_flags_compose() {
        let args = vec![
            "foo.xc".to_string(),
            "-dump-tokens".to_string(),
            "-dump-code".to_string(),
        ];
        let parsed = parse_args(&args).unwrap();
        assert!(parsed.config.dump.tokens);
        assert!(parsed.config.dump.code);
        assert!(!parsed.config.dump.ast);
    }

    #[test]
    fn warning_level_above_three_is_rejected() {
        let args = vec!["foo.xc".to_string(), "-W4".to_string()];
        assert!(parse_args(&args).is_err());
    }

    #[test]
    fn help_flag_short_circuits_without_input() {
        let args = vec!["-h".to_string()];
        let parsed = parse_args(&args).unwrap();
        assert_eq!(parsed.action, Action::Help);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let args = vec!["foo.xc".to_string(), "--bogus".to_string()];
        assert!(parse_args(&args).is_err());
    }
}
