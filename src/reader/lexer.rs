//! This file contains all items related to the lexical phase of the program.
//! It takes a string representing the line being lexed and converts it into a linear structure of Tokens.

use logos::{Logos, Span};

use crate::types::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[\s,]+")]
pub enum Token<'t> {
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    /// Single quote
    #[token("'")]
    Quote,
    /// Backtick
    #[token("`")]
    Quasiquote,
    /// Tilde
    #[token("~")]
    Unquote,
    /// Tilde + At
    #[token("~@")]
    SpliceUnquote,
    /// At-sign
    #[token("@")]
    Deref,
    /// Caret
    #[token("^")]
    Meta,
    /// Includes the surrounding quotes. A missing closing quote still lexes so the parser can report it.
    #[regex(r#""(?:\\.|[^\\"])*"?"#, |lex| lex.slice())]
    Str(&'t str),
    #[regex(r";[^\n]*", logos::skip)]
    Comment,
    /// Numbers, symbols, keywords and the literals `nil`, `true` and `false`
    #[regex(r#"[^\s\[\]{}()'"`,;~@^]+"#, |lex| lex.slice())]
    Atom(&'t str),
}

impl Token<'_> {
    /// The character that closes this token, if it opens a collection
    pub fn closer(&self) -> Option<char> {
        match self {
            Token::OpenParen => Some(')'),
            Token::OpenBracket => Some(']'),
            Token::OpenBrace => Some('}'),
            _ => None,
        }
    }

    /// The character of a closing delimiter
    pub fn as_closer(&self) -> Option<char> {
        match self {
            Token::CloseParen => Some(')'),
            Token::CloseBracket => Some(']'),
            Token::CloseBrace => Some('}'),
            _ => None,
        }
    }
}

/// Split source text into tokens, keeping the span of each one for diagnostics
pub fn tokenize(input: &str) -> Result<Vec<(Token<'_>, Span)>, ParseError> {
    Token::lexer(input)
        .spanned()
        .map(|(res, span)| match res {
            Ok(token) => Ok((token, span)),
            Err(()) => Err(ParseError::InvalidToken {
                src: input.to_string(),
                span: span.into(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("lexes")
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test_case("(+ 1 2)", vec![Token::OpenParen, Token::Atom("+"), Token::Atom("1"), Token::Atom("2"), Token::CloseParen] ; "simple list")]
    #[test_case("~@xs", vec![Token::SpliceUnquote, Token::Atom("xs")] ; "splice unquote is one token")]
    #[test_case("~x", vec![Token::Unquote, Token::Atom("x")] ; "unquote")]
    #[test_case("1,2,,3", vec![Token::Atom("1"), Token::Atom("2"), Token::Atom("3")] ; "commas are whitespace")]
    #[test_case("a ; comment\nb", vec![Token::Atom("a"), Token::Atom("b")] ; "comments are skipped")]
    #[test_case(r#""a \"b\"" c"#, vec![Token::Str(r#""a \"b\"""#), Token::Atom("c")] ; "escaped quotes stay in the string")]
    #[test_case(r#""abc"#, vec![Token::Str(r#""abc"#)] ; "unterminated string still lexes")]
    #[test_case("^{:a 1} x", vec![Token::Meta, Token::OpenBrace, Token::Atom(":a"), Token::Atom("1"), Token::CloseBrace, Token::Atom("x")] ; "metadata")]
    fn lexes(input: &str, expected: Vec<Token>) {
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn spans_point_into_the_source() {
        let tokens = tokenize("  (abc)").expect("lexes");
        assert_eq!(tokens[1], (Token::Atom("abc"), 3..6));
    }
}
