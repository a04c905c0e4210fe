//! A small Lisp in the MAL family: reader, printer, environments and a
//! trampolined evaluator with macros, plus a builtin namespace and REPL.

pub mod config;
pub mod core;
pub mod env;
pub mod eval;
pub mod printer;
pub mod reader;
pub mod repl;
pub mod types;

pub use crate::{
    env::Env,
    eval::eval,
    printer::pr_str,
    reader::read_str,
    repl::Repl,
    types::{AstNode, EvalResult, ReplError},
};
