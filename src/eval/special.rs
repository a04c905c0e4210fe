use std::rc::Rc;

use tracing::debug;

use super::{eval, macroexpand, quasiquote, Step};
use crate::{
    env::Env,
    types::{AstNode, EvalError, EvalResult, Function},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Reserved operator names that the evaluator handles itself
pub enum SpecialForm {
    Def,
    Let,
    Do,
    If,
    Fn,
    Quote,
    Quasiquote,
    QuasiquoteExpand,
    DefMacro,
    MacroExpand,
    Try,
}

impl SpecialForm {
    pub fn from_symbol(sym: &str) -> Option<Self> {
        match sym {
            "def!" => Some(SpecialForm::Def),
            "let*" => Some(SpecialForm::Let),
            "do" => Some(SpecialForm::Do),
            "if" => Some(SpecialForm::If),
            "fn*" => Some(SpecialForm::Fn),
            "quote" => Some(SpecialForm::Quote),
            "quasiquote" => Some(SpecialForm::Quasiquote),
            "quasiquoteexpand" => Some(SpecialForm::QuasiquoteExpand),
            "defmacro!" => Some(SpecialForm::DefMacro),
            "macroexpand" => Some(SpecialForm::MacroExpand),
            "try*" => Some(SpecialForm::Try),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpecialForm::Def => "def!",
            SpecialForm::Let => "let*",
            SpecialForm::Do => "do",
            SpecialForm::If => "if",
            SpecialForm::Fn => "fn*",
            SpecialForm::Quote => "quote",
            SpecialForm::Quasiquote => "quasiquote",
            SpecialForm::QuasiquoteExpand => "quasiquoteexpand",
            SpecialForm::DefMacro => "defmacro!",
            SpecialForm::MacroExpand => "macroexpand",
            SpecialForm::Try => "try*",
        }
    }

    /// Run this form. `items` is the whole list, operator included.
    pub(crate) fn evaluate(self, items: &[AstNode], env: &Env) -> EvalResult<Step> {
        let form = self.name();
        match self {
            SpecialForm::Def => eval_def(items, env),
            SpecialForm::Let => eval_let(items, env),
            SpecialForm::Do => eval_do(items, env),
            SpecialForm::If => eval_if(items, env),
            SpecialForm::Fn => eval_fn(items, env),
            SpecialForm::Quote => match items {
                [_, quoted] => Ok(Step::Return(quoted.clone())),
                _ => Err(EvalError::shape(form, "expected exactly one form").into()),
            },
            SpecialForm::Quasiquote => match items {
                [_, template] => Ok(Step::Continue(quasiquote(template)?, env.clone())),
                _ => Err(EvalError::shape(form, "expected exactly one form").into()),
            },
            SpecialForm::QuasiquoteExpand => match items {
                [_, template] => Ok(Step::Return(quasiquote(template)?)),
                _ => Err(EvalError::shape(form, "expected exactly one form").into()),
            },
            SpecialForm::DefMacro => eval_defmacro(items, env),
            SpecialForm::MacroExpand => match items {
                [_, call] => Ok(Step::Return(macroexpand(call.clone(), env)?)),
                _ => Err(EvalError::shape(form, "expected exactly one form").into()),
            },
            SpecialForm::Try => eval_try(items, env),
        }
    }
}

fn eval_def(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    match items {
        [_, AstNode::Symbol(name), value] => {
            let evaluated = eval(value.clone(), env.clone())?;
            debug!(symbol = %name, "def!");
            Ok(Step::Return(env.set(name, evaluated)))
        }
        [_, _, _] => Err(EvalError::shape("def!", "can only bind to a symbol").into()),
        [_, AstNode::Symbol(name)] => {
            Err(EvalError::shape("def!", format!("no value to bind to symbol {name}")).into())
        }
        _ => Err(EvalError::shape("def!", "expected a symbol and a value").into()),
    }
}

fn eval_let(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    let [_, bindings, body] = items else {
        return Err(EvalError::shape("let*", "expected bindings and a body").into());
    };
    let Some(bindings) = bindings.as_seq() else {
        return Err(EvalError::shape("let*", "bindings must be a list or vector").into());
    };
    if bindings.len() % 2 != 0 {
        return Err(EvalError::shape("let*", "bindings must come in symbol/value pairs").into());
    }
    let let_env = Env::new(Some(env.clone()));
    for pair in bindings.chunks(2) {
        let AstNode::Symbol(name) = &pair[0] else {
            return Err(EvalError::shape(
                "let*",
                format!("cannot bind to a {}", pair[0].type_name()),
            )
            .into());
        };
        let value = eval(pair[1].clone(), let_env.clone())?;
        let_env.set(name, value);
    }
    Ok(Step::Continue(body.clone(), let_env))
}

fn eval_do(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    match items {
        [_, between @ .., last] => {
            for form in between {
                eval(form.clone(), env.clone())?;
            }
            Ok(Step::Continue(last.clone(), env.clone()))
        }
        _ => Ok(Step::Return(AstNode::Nil)),
    }
}

fn eval_if(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    let (condition, then, otherwise) = match items {
        [_, condition, then] => (condition, then, None),
        [_, condition, then, otherwise] => (condition, then, Some(otherwise)),
        [_] | [_, _] => {
            return Err(EvalError::shape("if", "expected a condition and a branch").into())
        }
        _ => return Err(EvalError::shape("if", "too many branches").into()),
    };
    if eval(condition.clone(), env.clone())?.is_truthy() {
        Ok(Step::Continue(then.clone(), env.clone()))
    } else {
        match otherwise {
            Some(branch) => Ok(Step::Continue(branch.clone(), env.clone())),
            None => Ok(Step::Return(AstNode::Nil)),
        }
    }
}

fn eval_fn(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    let [_, params, body] = items else {
        return Err(EvalError::shape("fn*", "expected a parameter list and a body").into());
    };
    let Some(params) = params.as_seq() else {
        return Err(EvalError::shape("fn*", "parameters must be a list or vector").into());
    };
    let params = params
        .iter()
        .map(|param| match param {
            AstNode::Symbol(name) => Ok(name.clone()),
            other => Err(EvalError::shape(
                "fn*",
                format!("parameters must all be symbols, got {}", other.type_name()),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Step::Return(AstNode::function(Function::closure(
        params,
        body.clone(),
        env.clone(),
    ))))
}

fn eval_defmacro(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    let [_, AstNode::Symbol(name), value] = items else {
        return Err(EvalError::shape("defmacro!", "expected a symbol and a function").into());
    };
    match eval(value.clone(), env.clone())? {
        AstNode::Function(func) => {
            debug!(symbol = %name, "defmacro!");
            let mac = AstNode::Function(Rc::new(func.to_macro()));
            Ok(Step::Return(env.set(name, mac)))
        }
        other => Err(EvalError::type_mismatch("defmacro!", "function", &other).into()),
    }
}

fn eval_try(items: &[AstNode], env: &Env) -> EvalResult<Step> {
    let (body, handler) = match items {
        [_, body] => (body, None),
        [_, body, AstNode::List(clause, _)] => match clause.as_slice() {
            [head, AstNode::Symbol(name), handler] if head.is_symbol("catch*") => {
                (body, Some((name, handler)))
            }
            _ => {
                return Err(EvalError::shape("try*", "expected (catch* symbol handler)").into())
            }
        },
        _ => return Err(EvalError::shape("try*", "expected a body and a catch* clause").into()),
    };
    let result = eval(body.clone(), env.clone());
    match (result, handler) {
        (Ok(value), _) => Ok(Step::Return(value)),
        (Err(err), None) => Err(err),
        (Err(err), Some((name, handler))) => {
            debug!(error = %err, "caught by try*");
            let catch_env = Env::new(Some(env.clone()));
            catch_env.set(name, err.into_value());
            Ok(Step::Continue(handler.clone(), catch_env))
        }
    }
}
