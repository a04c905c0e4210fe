//! Turns source text into [`AstNode`] forms

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{AstNode, ParseError};

pub mod lexer;
pub mod parser;

use self::{lexer::tokenize, parser::Reader};

/// Read the first form of `input`; blank input reads as `nil`
pub fn read_str(input: &str) -> Result<AstNode, ParseError> {
    let tokens = tokenize(input)?;
    Reader::new(input, tokens).read_form()
}

/// Whether an atom is a number literal
pub fn is_number(atom: &str) -> bool {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("number pattern is valid"))
        .is_match(atom)
}
