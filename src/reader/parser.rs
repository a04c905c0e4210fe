//! Module for parsing tokens into forms

use logos::Span;

use super::{is_number, lexer::Token};
use crate::types::{collection::Map, AstNode, MapKey, ParseError};

/// Cursor over the tokens of one piece of source text
pub struct Reader<'t> {
    src: &'t str,
    tokens: Vec<(Token<'t>, Span)>,
    position: usize,
}

impl<'t> Reader<'t> {
    pub fn new(src: &'t str, tokens: Vec<(Token<'t>, Span)>) -> Self {
        Reader {
            src,
            tokens,
            position: 0,
        }
    }

    fn next(&mut self) -> Option<(Token<'t>, Span)> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token<'t>> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    /// Read the next complete form. No tokens left reads as `nil`.
    pub fn read_form(&mut self) -> Result<AstNode, ParseError> {
        let Some((token, span)) = self.next() else {
            return Ok(AstNode::Nil);
        };
        match token {
            Token::OpenParen => self.read_sequence(')', span).map(|(items, _)| AstNode::list(items)),
            Token::OpenBracket => self
                .read_sequence(']', span)
                .map(|(items, _)| AstNode::vector(items)),
            Token::OpenBrace => self.read_map(span),
            Token::CloseParen | Token::CloseBracket | Token::CloseBrace => {
                Err(ParseError::UnexpectedCloser {
                    found: token.as_closer().unwrap_or(')'),
                    src: self.src.to_string(),
                    span: span.into(),
                })
            }
            Token::Quote => self.read_wrapped("quote", "'", span),
            Token::Quasiquote => self.read_wrapped("quasiquote", "`", span),
            Token::Unquote => self.read_wrapped("unquote", "~", span),
            Token::SpliceUnquote => self.read_wrapped("splice-unquote", "~@", span),
            Token::Deref => self.read_wrapped("deref", "@", span),
            Token::Meta => {
                let meta = self.read_operand("^", &span)?;
                let form = self.read_operand("^", &span)?;
                Ok(AstNode::list(vec![AstNode::symbol("with-meta"), form, meta]))
            }
            Token::Str(raw) => self.read_string(raw, span),
            Token::Atom(atom) => Ok(read_atom(atom)),
            Token::Comment => self.read_form(),
        }
    }

    /// Read forms until `closer`, returning them with the end offset of the closer
    fn read_sequence(
        &mut self,
        closer: char,
        open: Span,
    ) -> Result<(Vec<AstNode>, usize), ParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::Unbalanced {
                        expected: closer,
                        src: self.src.to_string(),
                        span: open.into(),
                    })
                }
                Some(token) if token.as_closer() == Some(closer) => {
                    let end = self.next().map_or(open.end, |(_, span)| span.end);
                    return Ok((items, end));
                }
                Some(_) => items.push(self.read_form()?),
            }
        }
    }

    fn read_map(&mut self, open: Span) -> Result<AstNode, ParseError> {
        let start = open.start;
        let (items, end) = self.read_sequence('}', open)?;
        if items.len() % 2 != 0 {
            return Err(ParseError::OddMapEntries {
                src: self.src.to_string(),
                span: (start..end).into(),
            });
        }
        let mut map = Map::new();
        for pair in items.chunks(2) {
            let key = MapKey::from_node(&pair[0]).map_err(|_| ParseError::InvalidMapKey {
                src: self.src.to_string(),
                span: (start..end).into(),
            })?;
            map.insert(key, pair[1].clone());
        }
        Ok(AstNode::map(map))
    }

    /// The form following a reader macro
    fn read_operand(&mut self, after: &'static str, span: &Span) -> Result<AstNode, ParseError> {
        match self.peek() {
            Some(token) if token.as_closer().is_none() => self.read_form(),
            _ => Err(ParseError::MissingForm {
                after,
                src: self.src.to_string(),
                span: span.clone().into(),
            }),
        }
    }

    fn read_wrapped(
        &mut self,
        name: &str,
        after: &'static str,
        span: Span,
    ) -> Result<AstNode, ParseError> {
        let form = self.read_operand(after, &span)?;
        Ok(AstNode::list(vec![AstNode::symbol(name), form]))
    }

    fn read_string(&self, raw: &str, span: Span) -> Result<AstNode, ParseError> {
        let body = raw.strip_prefix('"').unwrap_or(raw);
        unescape(body)
            .map(AstNode::String)
            .ok_or_else(|| ParseError::UnterminatedString {
                src: self.src.to_string(),
                span: span.into(),
            })
    }
}

/// Resolve escapes in a string body that still carries its closing quote.
/// Gives `None` when that quote is missing.
fn unescape(body: &str) -> Option<String> {
    let mut chars = body.chars();
    let mut out = String::with_capacity(body.len());
    while let Some(c) = chars.next() {
        match c {
            '"' => return chars.next().is_none().then_some(out),
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            c => out.push(c),
        }
    }
    None
}

fn read_atom(atom: &str) -> AstNode {
    match atom {
        "nil" => AstNode::Nil,
        "true" => AstNode::Bool(true),
        "false" => AstNode::Bool(false),
        num if is_number(num) => num
            .parse()
            .map(AstNode::Number)
            .unwrap_or_else(|_| AstNode::symbol(num)),
        keyword if keyword.starts_with(':') => AstNode::Keyword(keyword.to_string()),
        symbol => AstNode::symbol(symbol),
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(r#""abc""#, Some("abc") ; "plain")]
    #[test_case(r#""a\nb""#, Some("a\nb") ; "newline escape")]
    #[test_case(r#""a\\b""#, Some("a\\b") ; "backslash escape")]
    #[test_case(r#""a\"b""#, Some("a\"b") ; "quote escape")]
    #[test_case(r#""a\tb""#, Some("a\\tb") ; "unknown escape keeps backslash")]
    #[test_case(r#""abc"#, None ; "missing closing quote")]
    #[test_case(r#""abc\""#, None ; "escaped closing quote")]
    fn unescapes(raw: &str, expected: Option<&str>) {
        assert_eq!(unescape(&raw[1..]).as_deref(), expected);
    }

    #[test_case("42", AstNode::Number(42.0) ; "integer")]
    #[test_case("-3.5", AstNode::Number(-3.5) ; "negative float")]
    #[test_case("-", AstNode::symbol("-") ; "minus is a symbol")]
    #[test_case("1abc", AstNode::symbol("1abc") ; "number prefix is a symbol")]
    #[test_case(":kw", AstNode::Keyword(":kw".into()) ; "keyword")]
    #[test_case("nil", AstNode::Nil ; "nil")]
    #[test_case("true", AstNode::Bool(true) ; "true literal")]
    fn reads_atoms(atom: &str, expected: AstNode) {
        assert_eq!(read_atom(atom), expected);
    }
}
