use crate::types::{AstNode, EvalError};

/// Rewrite a quasiquoted template into `cons`/`concat`/`vec` calls that build it at runtime
pub fn quasiquote(ast: &AstNode) -> Result<AstNode, EvalError> {
    match ast {
        AstNode::Map(..) | AstNode::Symbol(_) => Ok(AstNode::list(vec![
            AstNode::symbol("quote"),
            ast.clone(),
        ])),
        AstNode::List(items, _) => match items.as_slice() {
            [head, rest @ ..] if head.is_symbol("unquote") => match rest {
                [form] => Ok(form.clone()),
                _ => Err(EvalError::shape("unquote", "expected exactly one form")),
            },
            elements => expand_sequence(elements),
        },
        AstNode::Vector(items, _) => Ok(AstNode::list(vec![
            AstNode::symbol("vec"),
            expand_sequence(items)?,
        ])),
        _ => Ok(ast.clone()),
    }
}

/// Build the result right to left, starting from an empty list
fn expand_sequence(elements: &[AstNode]) -> Result<AstNode, EvalError> {
    elements
        .iter()
        .rev()
        .try_fold(AstNode::list(vec![]), |acc, element| -> Result<_, EvalError> {
            Ok(match spliced(element)? {
                Some(form) => AstNode::list(vec![AstNode::symbol("concat"), form.clone(), acc]),
                None => AstNode::list(vec![AstNode::symbol("cons"), quasiquote(element)?, acc]),
            })
        })
}

/// The operand of a `(splice-unquote form)` element
fn spliced(element: &AstNode) -> Result<Option<&AstNode>, EvalError> {
    match element {
        AstNode::List(items, _) => match items.as_slice() {
            [head, rest @ ..] if head.is_symbol("splice-unquote") => match rest {
                [form] => Ok(Some(form)),
                _ => Err(EvalError::shape("splice-unquote", "expected exactly one form")),
            },
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{printer::pr_str, reader::read_str};

    #[test_case("a", "(quote a)" ; "symbol is quoted")]
    #[test_case("{:a 1}", "(quote {:a 1})" ; "map is quoted")]
    #[test_case("7", "7" ; "literal is unchanged")]
    #[test_case(":k", ":k" ; "keyword is unchanged")]
    #[test_case("()", "()" ; "empty list")]
    #[test_case("(unquote x)", "x" ; "unquote unwraps")]
    #[test_case("(1 (unquote x))", "(cons 1 (cons x ()))" ; "unquote inside a list")]
    #[test_case("(1 (splice-unquote xs) 2)", "(cons 1 (concat xs (cons 2 ())))" ; "splice")]
    #[test_case("[a]", "(vec (cons (quote a) ()))" ; "vector becomes vec call")]
    #[test_case("((a))", "(cons (cons (quote a) ()) ())" ; "nested list")]
    fn expands(input: &str, expected: &str) {
        let form = read_str(input).expect("reads");
        let expanded = quasiquote(&form).expect("expands");
        assert_eq!(pr_str(&expanded, true), expected);
    }

    #[test]
    fn unquote_needs_one_form() {
        let form = read_str("(unquote)").expect("reads");
        assert!(matches!(quasiquote(&form), Err(EvalError::Shape { .. })));
    }
}
