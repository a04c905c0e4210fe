//! This module contains all the types used within the program.
//! Code and data share one representation, [`AstNode`]; the sub modules hold
//! maps, callables and errors.

use std::{cell::RefCell, rc::Rc};

use self::collection::Map;
pub use self::{
    collection::MapKey,
    error::{EvalError, ParseError, ReplError},
    function::{Closure, Function, NativeFn},
};
use crate::printer::pr_str;

pub mod collection;
pub mod error;
pub mod function;

pub type EvalResult<OkVal = AstNode, ErrVal = ReplError> = Result<OkVal, ErrVal>;

/// Value attached by `with-meta`; ignored by equality and printing
pub type Meta = Option<Rc<AstNode>>;

#[derive(Debug, Clone, Default)]
/// A single value, which is also a single form of source code
pub enum AstNode {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Symbol(String),
    /// Text includes the leading ':'
    Keyword(String),
    List(Rc<Vec<AstNode>>, Meta),
    Vector(Rc<Vec<AstNode>>, Meta),
    Map(Rc<Map>, Meta),
    Function(Rc<Function>),
    /// Shared mutable cell; every copy observes the same contents
    Atom(Rc<RefCell<AstNode>>),
    /// Condition raised by `throw`, wrapping the thrown value
    Error(Rc<AstNode>),
}

impl AstNode {
    pub fn list(items: Vec<AstNode>) -> Self {
        AstNode::List(Rc::new(items), None)
    }

    pub fn vector(items: Vec<AstNode>) -> Self {
        AstNode::Vector(Rc::new(items), None)
    }

    pub fn map(map: Map) -> Self {
        AstNode::Map(Rc::new(map), None)
    }

    pub fn symbol(name: &str) -> Self {
        AstNode::Symbol(name.to_string())
    }

    pub fn function(func: Function) -> Self {
        AstNode::Function(Rc::new(func))
    }

    pub fn atom(value: AstNode) -> Self {
        AstNode::Atom(Rc::new(RefCell::new(value)))
    }

    pub fn error(value: AstNode) -> Self {
        AstNode::Error(Rc::new(value))
    }

    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, AstNode::Nil | AstNode::Bool(false))
    }

    pub fn is_symbol(&self, name: &str) -> bool {
        matches!(self, AstNode::Symbol(sym) if sym == name)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            AstNode::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// Elements of a list or vector
    pub fn as_seq(&self) -> Option<&[AstNode]> {
        match self {
            AstNode::List(items, _) | AstNode::Vector(items, _) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Metadata of a collection or function; `None` for values that cannot carry any
    pub fn meta(&self) -> Option<AstNode> {
        match self {
            AstNode::List(_, meta) | AstNode::Vector(_, meta) | AstNode::Map(_, meta) => {
                Some(meta.as_deref().cloned().unwrap_or_default())
            }
            AstNode::Function(func) => Some(func.meta().as_deref().cloned().unwrap_or_default()),
            _ => None,
        }
    }

    /// Copy of a collection or function carrying `meta`, leaving `self` untouched
    pub fn with_meta(&self, meta: AstNode) -> Option<AstNode> {
        let meta = Some(Rc::new(meta));
        match self {
            AstNode::List(items, _) => Some(AstNode::List(items.clone(), meta)),
            AstNode::Vector(items, _) => Some(AstNode::Vector(items.clone(), meta)),
            AstNode::Map(map, _) => Some(AstNode::Map(map.clone(), meta)),
            AstNode::Function(func) => Some(AstNode::function(func.with_meta(meta))),
            _ => None,
        }
    }

    /// Name of the variant, as shown in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AstNode::Nil => "nil",
            AstNode::Bool(_) => "boolean",
            AstNode::Number(_) => "number",
            AstNode::String(_) => "string",
            AstNode::Symbol(_) => "symbol",
            AstNode::Keyword(_) => "keyword",
            AstNode::List(..) => "list",
            AstNode::Vector(..) => "vector",
            AstNode::Map(..) => "map",
            AstNode::Function(func) if func.is_macro() => "macro",
            AstNode::Function(_) => "function",
            AstNode::Atom(_) => "atom",
            AstNode::Error(_) => "error",
        }
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AstNode::Nil, AstNode::Nil) => true,
            (AstNode::Bool(l), AstNode::Bool(r)) => l == r,
            (AstNode::Number(l), AstNode::Number(r)) => l == r,
            (AstNode::String(l), AstNode::String(r))
            | (AstNode::Symbol(l), AstNode::Symbol(r))
            | (AstNode::Keyword(l), AstNode::Keyword(r)) => l == r,
            (
                AstNode::List(l, _) | AstNode::Vector(l, _),
                AstNode::List(r, _) | AstNode::Vector(r, _),
            ) => l == r,
            (AstNode::Map(l, _), AstNode::Map(r, _)) => l == r,
            (AstNode::Function(l), AstNode::Function(r)) => Rc::ptr_eq(l, r),
            (AstNode::Atom(l), AstNode::Atom(r)) => Rc::ptr_eq(l, r),
            (AstNode::Error(l), AstNode::Error(r)) => l == r,
            _ => false,
        }
    }
}

impl std::fmt::Display for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&pr_str(self, true))
    }
}

impl From<f64> for AstNode {
    fn from(value: f64) -> Self {
        AstNode::Number(value)
    }
}

impl From<bool> for AstNode {
    fn from(value: bool) -> Self {
        AstNode::Bool(value)
    }
}

impl From<String> for AstNode {
    fn from(value: String) -> Self {
        AstNode::String(value)
    }
}
