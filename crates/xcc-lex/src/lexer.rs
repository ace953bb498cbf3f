//! Byte-stream to token-stream lexer.
//!
//! Per spec §9's design note, the convenience singleton, one-token peek
//! cache, and one-token unget slot from the original system are folded
//! directly into this struct — there is no process-wide lexer state here,
//! so nothing stops two `Lexer`s (e.g. over two files) from coexisting.

use crate::token::{lookup_keyword, Literal, Token, TokenKind};
use xcc_util::{Span, SymbolInterner};

pub struct Lexer {
    source: Vec<u8>,
    filename: String,
    position: usize,
    line: u32,
    column: u32,
    peeked: Option<Token>,
    ungot: Option<Token>,
    had_error: bool,
    error_msg: Option<String>,
    interner: SymbolInterner,
}

impl Lexer {
    pub fn new(source: &str, filename: &str) -> Self {
        Self {
            source: source.as_bytes().to_vec(),
            filename: filename.to_string(),
            position: 0,
            line: 1,
            column: 1,
            peeked: None,
            ungot: None,
            had_error: false,
            error_msg: None,
            interner: SymbolInterner::new(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_msg.as_deref()
    }

    pub fn interner(&self) -> &SymbolInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut SymbolInterner {
        &mut self.interner
    }

    /// Advance and return the next token, honouring the unget slot and peek
    /// cache ahead of scanning fresh source.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.ungot.take() {
            return tok;
        }
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan_token()
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Token {
        if let Some(tok) = &self.ungot {
            return tok.clone();
        }
        if self.peeked.is_none() {
            let tok = self.scan_token();
            self.peeked = Some(tok);
        }
        self.peeked.clone().unwrap()
    }

    /// Push a single token back. The next `next_token`/`peek_token` call
    /// returns it without touching the source.
    pub fn unget_token(&mut self, token: Token) {
        self.ungot = Some(token);
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn report_error(&mut self, msg: &str) {
        self.had_error = true;
        self.error_msg = Some(format!(
            "{}:{}:{}: error: {}",
            self.filename, self.line, self.column, msg
        ));
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.position).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.position + offset).copied()
    }

    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.position += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance_byte();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance_byte();
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    self.advance_byte();
                    self.advance_byte();
                    let mut closed = false;
                    while let Some(b) = self.peek_byte() {
                        if b == b'*' && self.peek_byte_at(1) == Some(b'/') {
                            self.advance_byte();
                            self.advance_byte();
                            closed = true;
                            break;
                        }
                        self.advance_byte();
                    }
                    if !closed {
                        self.report_error("unterminated block comment");
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start_span = self.span();

        let Some(first) = self.peek_byte() else {
            return Token::new(TokenKind::Eof, String::new(), start_span);
        };

        if is_ident_start(first) {
            return self.lex_identifier(start_span);
        }
        if first.is_ascii_digit() {
            return self.lex_number(start_span);
        }
        if first == b'.' && self.peek_byte_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false) {
            return self.lex_number(start_span);
        }
        if first == b'"' {
            return self.lex_string(start_span);
        }
        if first == b'\'' {
            return self.lex_char(start_span);
        }
        self.lex_operator(start_span)
    }

    fn lex_identifier(&mut self, span: Span) -> Token {
        let start = self.position;
        while let Some(b) = self.peek_byte() {
            if is_ident_continue(b) {
                self.advance_byte();
            } else {
                break;
            }
        }
        let spelling = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
        let kind = lookup_keyword(&spelling).unwrap_or(TokenKind::Identifier);
        let symbol = self.interner.intern(&spelling);
        Token::new(kind, spelling, span).with_symbol(symbol)
    }

    fn lex_number(&mut self, span: Span) -> Token {
        let start = self.position;

        // Hex / binary prefixes.
        if self.peek_byte() == Some(b'0')
            && matches!(self.peek_byte_at(1), Some(b'x') | Some(b'X'))
        {
            self.advance_byte();
            self.advance_byte();
            let digits_start = self.position;
            while self.peek_byte().map(|b| b.is_ascii_hexdigit()).unwrap_or(false) {
                self.advance_byte();
            }
            let digits = String::from_utf8_lossy(&self.source[digits_start..self.position]);
            let value = i64::from_str_radix(&digits, 16).unwrap_or(0);
            self.consume_int_suffix();
            let spelling =
                String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
            return Token::new(TokenKind::IntLiteral, spelling, span)
                .with_literal(Literal::Int(value));
        }
        if self.peek_byte() == Some(b'0')
            && matches!(self.peek_byte_at(1), Some(b'b') | Some(b'B'))
        {
            self.advance_byte();
            self.advance_byte();
            let digits_start = self.position;
            while matches!(self.peek_byte(), Some(b'0') | Some(b'1')) {
                self.advance_byte();
            }
            let digits = String::from_utf8_lossy(&self.source[digits_start..self.position]);
            let value = i64::from_str_radix(&digits, 2).unwrap_or(0);
            self.consume_int_suffix();
            let spelling =
                String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
            return Token::new(TokenKind::IntLiteral, spelling, span)
                .with_literal(Literal::Int(value));
        }

        // Decimal/octal integer part, with a possible float promotion.
        while self.peek_byte().map(|b| b.is_ascii_digit()).unwrap_or(false) {
            self.advance_byte();
        }

        let mut is_float = false;
        if self.peek_byte() == Some(b'.')
            && self.peek_byte_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            self.advance_byte();
            while self.peek_byte().map(|b| b.is_ascii_digit()).unwrap_or(false) {
                self.advance_byte();
            }
        } else if self.peek_byte() == Some(b'.') {
            is_float = true;
            self.advance_byte();
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.advance_byte();
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.advance_byte();
            }
            while self.peek_byte().map(|b| b.is_ascii_digit()).unwrap_or(false) {
                self.advance_byte();
            }
        }

        let digits = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();

        if is_float {
            let value: f64 = digits.parse().unwrap_or(0.0);
            self.consume_float_suffix();
            let spelling =
                String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
            return Token::new(TokenKind::FloatLiteral, spelling, span)
                .with_literal(Literal::Float(value));
        }

        let value = if digits.len() > 1 && digits.starts_with('0') {
            i64::from_str_radix(&digits[1..], 8).unwrap_or(0)
        } else {
            digits.parse().unwrap_or(0)
        };
        self.consume_int_suffix();
        let spelling = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
        Token::new(TokenKind::IntLiteral, spelling, span).with_literal(Literal::Int(value))
    }

    fn consume_int_suffix(&mut self) {
        while matches!(
            self.peek_byte(),
            Some(b'u') | Some(b'U') | Some(b'l') | Some(b'L')
        ) {
            self.advance_byte();
        }
    }

    fn consume_float_suffix(&mut self) {
        while matches!(
            self.peek_byte(),
            Some(b'f') | Some(b'F') | Some(b'l') | Some(b'L')
        ) {
            self.advance_byte();
        }
    }

    fn decode_escape(&mut self) -> Option<char> {
        let escape = self.advance_byte()?;
        Some(match escape {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'0' => '\0',
            b'\\' => '\\',
            b'\'' => '\'',
            b'"' => '"',
            b'a' => '\u{07}',
            b'b' => '\u{08}',
            b'f' => '\u{0C}',
            b'v' => '\u{0B}',
            b'x' => {
                let hi = self.advance_byte().unwrap_or(b'0');
                let lo = self.advance_byte().unwrap_or(b'0');
                let hex = format!("{}{}", hi as char, lo as char);
                let value = u8::from_str_radix(&hex, 16).unwrap_or(0);
                value as char
            }
            other => other as char,
        })
    }

    fn lex_string(&mut self, span: Span) -> Token {
        let start = self.position;
        self.advance_byte(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek_byte() {
                None => {
                    self.report_error("unterminated string literal");
                    break;
                }
                Some(b'\n') => {
                    self.report_error("unterminated string literal: embedded newline");
                    break;
                }
                Some(b'"') => {
                    self.advance_byte();
                    break;
                }
                Some(b'\\') => {
                    self.advance_byte();
                    if let Some(ch) = self.decode_escape() {
                        value.push(ch);
                    }
                }
                Some(_) => {
                    let b = self.advance_byte().unwrap();
                    value.push(b as char);
                }
            }
        }
        let spelling = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
        Token::new(TokenKind::StringLiteral, spelling, span).with_literal(Literal::Str(value))
    }

    fn lex_char(&mut self, span: Span) -> Token {
        let start = self.position;
        self.advance_byte(); // opening quote
        let value = match self.peek_byte() {
            Some(b'\\') => {
                self.advance_byte();
                self.decode_escape().unwrap_or('\0')
            }
            Some(_) => self.advance_byte().unwrap() as char,
            None => {
                self.report_error("unterminated char literal");
                '\0'
            }
        };
        if self.peek_byte() == Some(b'\'') {
            self.advance_byte();
        } else {
            self.report_error("unterminated char literal");
        }
        let spelling = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
        Token::new(TokenKind::CharLiteral, spelling, span).with_literal(Literal::Char(value))
    }

    fn lex_operator(&mut self, span: Span) -> Token {
        use TokenKind::*;
        let start = self.position;
        let first = self.advance_byte().unwrap();
        let second = self.peek_byte();
        let third = self.peek_byte_at(1);

        let kind = match (first, second, third) {
            (b'<', Some(b'<'), Some(b'=')) => {
                self.advance_byte();
                self.advance_byte();
                ShlEq
            }
            (b'>', Some(b'>'), Some(b'=')) => {
                self.advance_byte();
                self.advance_byte();
                ShrEq
            }
            (b'<', Some(b'<'), _) => {
                self.advance_byte();
                Shl
            }
            (b'>', Some(b'>'), _) => {
                self.advance_byte();
                Shr
            }
            (b'-', Some(b'>'), _) => {
                self.advance_byte();
                Arrow
            }
            (b'+', Some(b'+'), _) => {
                self.advance_byte();
                PlusPlus
            }
            (b'-', Some(b'-'), _) => {
                self.advance_byte();
                MinusMinus
            }
            (b'=', Some(b'='), _) => {
                self.advance_byte();
                EqEq
            }
            (b'!', Some(b'='), _) => {
                self.advance_byte();
                BangEq
            }
            (b'<', Some(b'='), _) => {
                self.advance_byte();
                LtEq
            }
            (b'>', Some(b'='), _) => {
                self.advance_byte();
                GtEq
            }
            (b'&', Some(b'&'), _) => {
                self.advance_byte();
                AmpAmp
            }
            (b'|', Some(b'|'), _) => {
                self.advance_byte();
                PipePipe
            }
            (b'+', Some(b'='), _) => {
                self.advance_byte();
                PlusEq
            }
            (b'-', Some(b'='), _) => {
                self.advance_byte();
                MinusEq
            }
            (b'*', Some(b'='), _) => {
                self.advance_byte();
                StarEq
            }
            (b'/', Some(b'='), _) => {
                self.advance_byte();
                SlashEq
            }
            (b'%', Some(b'='), _) => {
                self.advance_byte();
                PercentEq
            }
            (b'&', Some(b'='), _) => {
                self.advance_byte();
                AmpEq
            }
            (b'|', Some(b'='), _) => {
                self.advance_byte();
                PipeEq
            }
            (b'^', Some(b'='), _) => {
                self.advance_byte();
                CaretEq
            }
            (b'+', _, _) => Plus,
            (b'-', _, _) => Minus,
            (b'*', _, _) => Star,
            (b'/', _, _) => Slash,
            (b'%', _, _) => Percent,
            (b'&', _, _) => Amp,
            (b'|', _, _) => Pipe,
            (b'^', _, _) => Caret,
            (b'~', _, _) => Tilde,
            (b'!', _, _) => Bang,
            (b'<', _, _) => Lt,
            (b'>', _, _) => Gt,
            (b'=', _, _) => Assign,
            (b'.', _, _) => Dot,
            (b',', _, _) => Comma,
            (b'?', _, _) => Question,
            (b':', _, _) => Colon,
            (b';', _, _) => Semicolon,
            (b'(', _, _) => LParen,
            (b')', _, _) => RParen,
            (b'{', _, _) => LBrace,
            (b'}', _, _) => RBrace,
            (b'[', _, _) => LBracket,
            (b']', _, _) => RBracket,
            (other, _, _) => {
                self.report_error(&format!("unexpected character '{}'", other as char));
                Error
            }
        };
        let spelling = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
        Token::new(kind, spelling, span)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source, "<test>");
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn eof_terminates_token_stream() {
        let ks = kinds("int x;");
        assert_eq!(*ks.last().unwrap(), TokenKind::Eof);
        assert_eq!(ks.iter().filter(|k| **k == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn scenario_six_literal_payloads() {
        let mut lexer = Lexer::new(r#"0x1F 0b101 017 3.14e-2 "a\nb" 'z'"#, "<test>");
        let expected = [
            Literal::Int(31),
            Literal::Int(5),
            Literal::Int(15),
            Literal::Float(0.0314),
            Literal::Str("a\nb".to_string()),
            Literal::Char('z'),
        ];
        for want in expected {
            let tok = lexer.next_token();
            match (&tok.literal, &want) {
                (Some(Literal::Int(a)), Literal::Int(b)) => assert_eq!(a, b),
                (Some(Literal::Float(a)), Literal::Float(b)) => assert!((a - b).abs() < 1e-9),
                (Some(Literal::Str(a)), Literal::Str(b)) => assert_eq!(a, b),
                (Some(Literal::Char(a)), Literal::Char(b)) => assert_eq!(a, b),
                _ => panic!("literal mismatch: {:?} vs {:?}", tok.literal, want),
            }
        }
        assert!(!lexer.had_error());
    }

    #[test]
    fn longest_match_operator_wins() {
        let mut lexer = Lexer::new("<<= << <", "<test>");
        assert_eq!(lexer.next_token().kind, TokenKind::ShlEq);
        assert_eq!(lexer.next_token().kind, TokenKind::Shl);
        assert_eq!(lexer.next_token().kind, TokenKind::Lt);
    }

    #[test]
    fn peek_then_next_returns_same_token() {
        let mut lexer = Lexer::new("foo bar", "<test>");
        let peeked = lexer.peek_token();
        let next = lexer.next_token();
        assert_eq!(peeked.spelling, next.spelling);
    }

    #[test]
    fn unget_replays_token_without_rescanning_source() {
        let mut lexer = Lexer::new("foo bar", "<test>");
        let first = lexer.next_token();
        let second = lexer.next_token();
        lexer.unget_token(second.clone());
        let replayed = lexer.next_token();
        assert_eq!(replayed.spelling, second.spelling);
        assert_eq!(first.spelling, "foo");
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let mut lexer = Lexer::new("/* never closes", "<test>");
        lexer.next_token();
        assert!(lexer.had_error());
    }

    #[test]
    fn identical_identifiers_intern_to_same_symbol() {
        let mut lexer = Lexer::new("foo foo bar", "<test>");
        let a = lexer.next_token().symbol;
        let b = lexer.next_token().symbol;
        let c = lexer.next_token().symbol;
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
