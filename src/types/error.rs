//! These are types that are used to represent errors at different stages of the program

use miette::{Diagnostic, SourceSpan};

use super::AstNode;
use crate::printer::pr_str;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, Diagnostic)]
/// Errors that occur while reading source text into forms
pub enum ParseError {
    /// Missing an ending character, show what it expects there to be
    #[display(fmt = "expected '{}', got EOF", expected)]
    #[diagnostic(
        code(ensemble::reader::unbalanced),
        help("every opening delimiter needs a matching closer")
    )]
    Unbalanced {
        expected: char,
        #[source_code]
        src: String,
        #[label("opened here")]
        span: SourceSpan,
    },
    #[display(fmt = "unexpected '{}'", found)]
    #[diagnostic(code(ensemble::reader::unexpected_closer))]
    UnexpectedCloser {
        found: char,
        #[source_code]
        src: String,
        #[label("nothing to close")]
        span: SourceSpan,
    },
    #[display(fmt = "expected '\"', got EOF")]
    #[diagnostic(code(ensemble::reader::unterminated_string))]
    UnterminatedString {
        #[source_code]
        src: String,
        #[label("string starts here")]
        span: SourceSpan,
    },
    #[display(fmt = "map literal must contain an even number of forms")]
    #[diagnostic(code(ensemble::reader::odd_map))]
    OddMapEntries {
        #[source_code]
        src: String,
        #[label("this map")]
        span: SourceSpan,
    },
    #[display(fmt = "map keys must be strings, keywords, numbers or symbols")]
    #[diagnostic(code(ensemble::reader::map_key))]
    InvalidMapKey {
        #[source_code]
        src: String,
        #[label("in this map")]
        span: SourceSpan,
    },
    #[display(fmt = "expected a form after '{}'", after)]
    #[diagnostic(code(ensemble::reader::missing_form))]
    MissingForm {
        after: &'static str,
        #[source_code]
        src: String,
        #[label("nothing follows this")]
        span: SourceSpan,
    },
    #[display(fmt = "invalid token")]
    #[diagnostic(code(ensemble::reader::invalid_token))]
    InvalidToken {
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, Diagnostic)]
/// Errors that occur during the evaluation stage
pub enum EvalError {
    /// Symbol is not bound in any enclosing environment
    #[display(fmt = "'{}' not found", _0)]
    #[diagnostic(code(ensemble::eval::not_found))]
    NotFound(String),
    /// A special form does not have the structure it requires
    #[display(fmt = "{}: {}", form, reason)]
    #[diagnostic(code(ensemble::eval::shape))]
    Shape { form: &'static str, reason: String },
    #[display(fmt = "{}: expected {} argument(s), got {}", name, expected, got)]
    #[diagnostic(code(ensemble::eval::arity))]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    /// Builtin received an argument of the wrong variant
    #[display(fmt = "{}: expected {}, got {}", name, expected, got)]
    #[diagnostic(code(ensemble::eval::type_mismatch))]
    Type {
        name: String,
        expected: &'static str,
        got: &'static str,
    },
    #[display(fmt = "{}: index {} out of bounds for length {}", name, index, len)]
    #[diagnostic(code(ensemble::eval::out_of_bounds))]
    OutOfBounds {
        name: String,
        index: i64,
        len: usize,
    },
    #[display(fmt = "cannot call a value of type {}", _0)]
    #[diagnostic(
        code(ensemble::eval::not_callable),
        help("only functions may appear in operator position")
    )]
    NotCallable(&'static str),
    #[display(fmt = "{} cannot be used as a map key", _0)]
    #[diagnostic(code(ensemble::eval::map_key))]
    InvalidMapKey(&'static str),
    #[display(fmt = "{}", _0)]
    #[diagnostic(code(ensemble::eval::io))]
    Io(String),
}

impl std::error::Error for EvalError {}

impl EvalError {
    pub fn shape(form: &'static str, reason: impl Into<String>) -> Self {
        EvalError::Shape {
            form,
            reason: reason.into(),
        }
    }

    pub fn arity(name: &str, expected: impl Into<String>, got: usize) -> Self {
        EvalError::Arity {
            name: name.to_string(),
            expected: expected.into(),
            got,
        }
    }

    pub fn type_mismatch(name: &str, expected: &'static str, got: &AstNode) -> Self {
        EvalError::Type {
            name: name.to_string(),
            expected,
            got: got.type_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::From, derive_more::Display)]
/// Union of all the types of errors in the program
pub enum ReplError {
    #[display(fmt = "{}", _0)]
    Parse(ParseError),
    #[display(fmt = "{}", _0)]
    Eval(EvalError),
    /// Raised from user code; the payload is always an [`AstNode::Error`]
    #[from(ignore)]
    #[display(fmt = "Uncaught exception: {}", "pr_str(_0, true)")]
    Thrown(AstNode),
}

impl std::error::Error for ReplError {}

impl ReplError {
    /// Raise a value, wrapping it as an error node unless it already is one
    pub fn throw(value: AstNode) -> Self {
        match value {
            err @ AstNode::Error(_) => ReplError::Thrown(err),
            other => ReplError::Thrown(AstNode::error(other)),
        }
    }

    /// The value a `catch*` handler is bound to for this failure.
    ///
    /// Thrown values are unwrapped to their payload, every other failure becomes its message.
    pub fn into_value(self) -> AstNode {
        match self {
            ReplError::Thrown(AstNode::Error(payload)) => (*payload).clone(),
            ReplError::Thrown(other) => other,
            err => AstNode::String(err.to_string()),
        }
    }

    /// Convert into a report that can cross thread boundaries and be rendered by miette
    pub fn into_report(self) -> miette::Report {
        match self {
            ReplError::Parse(err) => miette::Report::new(err),
            ReplError::Eval(err) => miette::Report::new(err),
            ReplError::Thrown(value) => {
                miette::miette!("Uncaught exception: {}", pr_str(&value, true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_symbol() {
        let err: ReplError = EvalError::NotFound("z".to_string()).into();
        assert_eq!(err.to_string(), "'z' not found");
    }

    #[test]
    fn thrown_values_are_wrapped_once() {
        let once = ReplError::throw(AstNode::Number(1.0));
        let twice = ReplError::throw(AstNode::error(AstNode::Number(1.0)));
        assert_eq!(once, twice);
        assert_eq!(once.into_value(), AstNode::Number(1.0));
    }

    #[test]
    fn host_failures_catch_as_their_message() {
        let err: ReplError = EvalError::shape("let*", "bindings must be a list or vector").into();
        assert_eq!(
            err.into_value(),
            AstNode::String("let*: bindings must be a list or vector".to_string())
        );
    }
}
