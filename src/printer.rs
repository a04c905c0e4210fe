use crate::types::AstNode;

/// Print out the AST expression.
///
/// With `print_readably` strings are quoted and escaped so the output reads back as the same value.
pub fn pr_str(ast: &AstNode, print_readably: bool) -> String {
    match ast {
        AstNode::Nil => String::from("nil"),
        AstNode::Bool(b) => b.to_string(),
        AstNode::Number(n) if n.is_nan() => String::from("NaN"),
        AstNode::Number(n) if n.is_infinite() && n.is_sign_negative() => String::from("-Infinity"),
        AstNode::Number(n) if n.is_infinite() => String::from("Infinity"),
        AstNode::Number(n) => n.to_string(),
        AstNode::String(s) if print_readably => escape(s),
        AstNode::String(s) => s.clone(),
        AstNode::Symbol(s) | AstNode::Keyword(s) => s.clone(),
        AstNode::List(items, _) => format!("({})", join(items, print_readably, " ")),
        AstNode::Vector(items, _) => format!("[{}]", join(items, print_readably, " ")),
        AstNode::Map(map, _) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!(
                    "{} {}",
                    pr_str(&k.to_node(), print_readably),
                    pr_str(v, print_readably)
                ))
                .collect::<Vec<_>>()
                .join(" ")
        ),
        AstNode::Function(func) if func.is_macro() => String::from("#<macro>"),
        AstNode::Function(_) => String::from("#<fn>"),
        AstNode::Atom(cell) => format!("(atom {})", pr_str(&cell.borrow(), print_readably)),
        AstNode::Error(payload) => pr_str(payload, print_readably),
    }
}

/// Print each value and join them with `separator`
pub fn join(items: &[AstNode], print_readably: bool, separator: &str) -> String {
    items
        .iter()
        .map(|item| pr_str(item, print_readably))
        .collect::<Vec<_>>()
        .join(separator)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
