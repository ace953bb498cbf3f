//! Tokeniser for the Xinu C dialect: turns a source buffer into a stream of
//! [`Token`]s on demand, with one-token peek and one-token pushback.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{lookup_keyword, Literal, Token, TokenKind};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn token_stream_always_terminates_in_eof(src in "[a-zA-Z0-9_ \t\n+\\-*/;(){}]{0,64}") {
            let mut lexer = Lexer::new(&src, "<prop>");
            let mut count = 0;
            loop {
                let tok = lexer.next_token();
                count += 1;
                if tok.kind == TokenKind::Eof {
                    break;
                }
                // Guard against infinite loops from a bug, not a real invariant.
                prop_assert!(count < 10_000);
            }
        }
    }
}
