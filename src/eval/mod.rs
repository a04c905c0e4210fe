//! The evaluator.
//!
//! [`eval`] is a trampoline: forms in tail position (the taken branch of `if`,
//! the last form of `do`, the body of `let*` and of closures) replace the current
//! form and environment instead of recursing, so tail recursive programs run in
//! constant host stack.

use tracing::trace;

use crate::{
    env::Env,
    types::{collection::Map, AstNode, EvalError, EvalResult},
};

mod quasiquote;
mod special;

pub use self::{quasiquote::quasiquote, special::SpecialForm};

/// What a single dispatch produced
pub(crate) enum Step {
    /// Finished with a value
    Return(AstNode),
    /// Keep evaluating this form in this environment
    Continue(AstNode, Env),
}

/// Evaluate the given expression and return the result
pub fn eval(ast: AstNode, env: Env) -> EvalResult {
    let mut current_ast = ast;
    let mut current_env = env;
    loop {
        current_ast = macroexpand(current_ast, &current_env)?;
        let items = match &current_ast {
            AstNode::List(items, _) if !items.is_empty() => items.clone(),
            _ => return eval_ast(&current_ast, &current_env),
        };
        let step = match items[0].as_symbol().and_then(SpecialForm::from_symbol) {
            Some(form) => form.evaluate(&items, &current_env)?,
            None => apply(&items, &current_env)?,
        };
        match step {
            Step::Return(value) => return Ok(value),
            Step::Continue(next_ast, next_env) => {
                current_ast = next_ast;
                current_env = next_env;
            }
        }
    }
}

/// Evaluate a form without applying it: symbols are looked up and
/// collections are evaluated element by element.
pub fn eval_ast(ast: &AstNode, env: &Env) -> EvalResult {
    match ast {
        AstNode::Symbol(sym) => Ok(env.get(sym)?),
        AstNode::List(items, _) => Ok(AstNode::list(eval_each(items, env)?)),
        AstNode::Vector(items, _) => Ok(AstNode::vector(eval_each(items, env)?)),
        AstNode::Map(map, _) => map
            .iter()
            .map(|(key, value)| eval(value.clone(), env.clone()).map(|v| (key.clone(), v)))
            .collect::<EvalResult<Map>>()
            .map(AstNode::map),
        _ => Ok(ast.clone()),
    }
}

fn eval_each(items: &[AstNode], env: &Env) -> EvalResult<Vec<AstNode>> {
    items
        .iter()
        .map(|item| eval(item.clone(), env.clone()))
        .collect()
}

/// Evaluate every element of a call and apply the head to the rest
fn apply(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    let evaluated = eval_each(items, env)?;
    let Some((head, args)) = evaluated.split_first() else {
        return Ok(Step::Return(AstNode::list(evaluated)));
    };
    match head {
        AstNode::Function(func) => match func.closure_parts() {
            Some(closure) => {
                trace!(args = args.len(), "tail call into closure");
                let call_env =
                    Env::with_bindings(Some(closure.env.clone()), &closure.params, args)?;
                Ok(Step::Continue(closure.body.clone(), call_env))
            }
            None => Ok(Step::Return(func.call(args)?)),
        },
        other => Err(EvalError::NotCallable(other.type_name()).into()),
    }
}

/// Repeatedly expand `ast` while its head names a macro in `env`
pub fn macroexpand(ast: AstNode, env: &Env) -> EvalResult {
    let mut current_ast = ast;
    loop {
        let AstNode::List(items, _) = &current_ast else {
            return Ok(current_ast);
        };
        let Some(AstNode::Function(mac)) = items
            .first()
            .and_then(AstNode::as_symbol)
            .and_then(|sym| env.get(sym).ok())
        else {
            return Ok(current_ast);
        };
        if !mac.is_macro() {
            return Ok(current_ast);
        }
        trace!(form = %current_ast, "expanding macro");
        let expanded = mac.call(&items[1..])?;
        current_ast = expanded;
    }
}
