//! Token kinds and the literal payloads that ride along with them.

use xcc_util::{Span, Symbol};

/// A fixed enumeration of every token the lexer can produce. Punctuation and
/// operators are listed longest-match first within [`lookup_operator`], not
/// here — this enum only names the *result*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals and names
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    Identifier,

    // Type keywords
    KwVoid,
    KwChar,
    KwShort,
    KwInt,
    KwLong,
    KwFloat,
    KwDouble,
    KwUnsigned,
    KwSigned,
    KwConst,
    KwVolatile,
    KwStatic,
    KwExtern,
    KwRegister,

    // Reserved-but-unsupported keywords (spec §9 Open Question)
    KwStruct,
    KwUnion,
    KwEnum,
    KwTypedef,
    KwSwitch,
    KwCase,
    KwDefault,
    KwGoto,
    KwCast,
    KwSyscall,
    KwInterrupt,

    // Control-flow keywords
    KwIf,
    KwElse,
    KwWhile,
    KwDo,
    KwFor,
    KwReturn,
    KwBreak,
    KwContinue,
    KwSizeof,

    // Xinu process/semaphore keywords
    KwProcess,
    KwSemaphore,
    KwSignal,
    KwWait,
    KwCreate,
    KwResume,
    KwSuspend,
    KwKill,
    KwSleep,
    KwYield,
    KwGetpid,
    KwGetprio,
    KwChprio,

    // Boolean/null literal keywords
    KwTrue,
    KwFalse,
    KwNull,
    KwNULL,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    AmpAmp,
    PipePipe,
    Bang,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    PlusPlus,
    MinusMinus,
    Arrow,

    // Punctuation
    Dot,
    Comma,
    Question,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Error,
    Eof,
}

impl TokenKind {
    /// True for tokens that are recognised but whose construct this
    /// compiler deliberately refuses to parse (spec §9 Open Question).
    pub fn is_reserved_unsupported(self) -> bool {
        matches!(
            self,
            TokenKind::KwStruct
                | TokenKind::KwUnion
                | TokenKind::KwEnum
                | TokenKind::KwTypedef
                | TokenKind::KwSwitch
                | TokenKind::KwCase
                | TokenKind::KwDefault
                | TokenKind::KwGoto
                | TokenKind::KwCast
                | TokenKind::KwSyscall
                | TokenKind::KwInterrupt
        )
    }
}

/// The literal value carried by a literal token, distinct from its spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
}

/// A single lexed token: kind, bounded spelling, optional literal payload,
/// and source position. Tokens are value-typed and copyable in spirit (the
/// `String`/`Literal` payload aside) — producing one advances the lexer but
/// keeps no back-pointer into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Bounded to 256 bytes per spec §3; longer identifiers/literals are
    /// truncated for display purposes only, lexing itself is unaffected.
    pub spelling: String,
    pub literal: Option<Literal>,
    pub span: Span,
    /// Interned spelling, used by the parser/symbol table so repeated
    /// identifier comparisons are integer compares.
    pub symbol: Option<Symbol>,
}

impl Token {
    pub fn new(kind: TokenKind, spelling: String, span: Span) -> Self {
        Self { kind, spelling, literal: None, span, symbol: None }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }
}

/// Longest-match static keyword table (spec §4.1). Returns `None` for any
/// spelling that is not a reserved word, i.e. an ordinary identifier.
pub fn lookup_keyword(spelling: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match spelling {
        "void" => KwVoid,
        "char" => KwChar,
        "short" => KwShort,
        "int" => KwInt,
        "long" => KwLong,
        "float" => KwFloat,
        "double" => KwDouble,
        "unsigned" => KwUnsigned,
        "signed" => KwSigned,
        "const" => KwConst,
        "volatile" => KwVolatile,
        "static" => KwStatic,
        "extern" => KwExtern,
        "register" => KwRegister,

        "struct" => KwStruct,
        "union" => KwUnion,
        "enum" => KwEnum,
        "typedef" => KwTypedef,
        "switch" => KwSwitch,
        "case" => KwCase,
        "default" => KwDefault,
        "goto" => KwGoto,
        "cast" => KwCast,
        "syscall" => KwSyscall,
        "interrupt" => KwInterrupt,

        "if" => KwIf,
        "else" => KwElse,
        "while" => KwWhile,
        "do" => KwDo,
        "for" => KwFor,
        "return" => KwReturn,
        "break" => KwBreak,
        "continue" => KwContinue,
        "sizeof" => KwSizeof,

        "process" => KwProcess,
        "semaphore" => KwSemaphore,
        "signal" => KwSignal,
        "wait" => KwWait,
        "create" => KwCreate,
        "resume" => KwResume,
        "suspend" => KwSuspend,
        "kill" => KwKill,
        "sleep" => KwSleep,
        "yield" => KwYield,
        "getpid" => KwGetpid,
        "getprio" => KwGetprio,
        "chprio" => KwChprio,

        "true" => KwTrue,
        "false" => KwFalse,
        "null" => KwNull,
        "NULL" => KwNULL,

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_round_trips_through_lookup() {
        let keywords = [
            "void", "char", "short", "int", "long", "float", "double", "unsigned", "signed",
            "const", "volatile", "static", "extern", "register", "struct", "union", "enum",
            "typedef", "switch", "case", "default", "goto", "cast", "syscall", "interrupt", "if",
            "else", "while", "do", "for", "return", "break", "continue", "sizeof", "process",
            "semaphore", "signal", "wait", "create", "resume", "suspend", "kill", "sleep",
            "yield", "getpid", "getprio", "chprio", "true", "false", "null", "NULL",
        ];
        for kw in keywords {
            assert!(lookup_keyword(kw).is_some(), "{kw} should be a keyword");
        }
    }

    #[test]
    fn non_keyword_identifier_is_not_a_keyword() {
        assert_eq!(lookup_keyword("my_variable"), None);
    }

    #[test]
    fn reserved_unsupported_set_matches_open_question_list() {
        let reserved = [
            TokenKind::KwStruct,
            TokenKind::KwUnion,
            TokenKind::KwEnum,
            TokenKind::KwTypedef,
            TokenKind::KwSwitch,
            TokenKind::KwCase,
            TokenKind::KwDefault,
            TokenKind::KwGoto,
            TokenKind::KwCast,
            TokenKind::KwSyscall,
            TokenKind::KwInterrupt,
        ];
        for kind in reserved {
            assert!(kind.is_reserved_unsupported());
        }
        assert!(!TokenKind::KwInt.is_reserved_unsupported());
    }
}
