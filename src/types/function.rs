use std::rc::Rc;

use super::{AstNode, EvalResult, Meta};
use crate::{env::Env, eval::eval};

/// Host callable backing every function value
pub type NativeFn = Rc<dyn Fn(&[AstNode]) -> EvalResult>;

#[derive(Clone)]
/// The pieces of a user defined function that the evaluator needs for tail calls
pub struct Closure {
    pub params: Rc<Vec<String>>,
    pub body: AstNode,
    pub env: Env,
}

#[derive(Clone)]
/// These are values which can be applied
pub struct Function {
    name: String,
    native: NativeFn,
    closure: Option<Closure>,
    is_macro: bool,
    meta: Meta,
}

impl Function {
    pub fn native(name: &str, func: impl Fn(&[AstNode]) -> EvalResult + 'static) -> Self {
        Function {
            name: name.to_string(),
            native: Rc::new(func),
            closure: None,
            is_macro: false,
            meta: None,
        }
    }

    /// A function created by `fn*`. Calling it directly evaluates the body in a fresh
    /// child of `env`, which is what builtins such as `map` and `swap!` rely on.
    pub fn closure(params: Vec<String>, body: AstNode, env: Env) -> Self {
        let closure = Closure {
            params: Rc::new(params),
            body,
            env,
        };
        let captured = closure.clone();
        Function {
            name: String::from("fn"),
            native: Rc::new(move |args: &[AstNode]| {
                let env = Env::with_bindings(Some(captured.env.clone()), &captured.params, args)?;
                eval(captured.body.clone(), env)
            }),
            closure: Some(closure),
            is_macro: false,
            meta: None,
        }
    }

    pub fn call(&self, args: &[AstNode]) -> EvalResult {
        (self.native)(args)
    }

    pub fn closure_parts(&self) -> Option<&Closure> {
        self.closure.as_ref()
    }

    pub fn is_macro(&self) -> bool {
        self.is_macro
    }

    /// Copy of this function flagged as a macro; the original is left untouched
    pub fn to_macro(&self) -> Self {
        Function {
            is_macro: true,
            ..self.clone()
        }
    }

    pub fn with_meta(&self, meta: Meta) -> Self {
        Function {
            meta,
            ..self.clone()
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Function");
        debug.field("name", &self.name);
        if let Some(closure) = &self.closure {
            debug
                .field("params", &closure.params)
                .field("body", &closure.body);
        }
        debug.field("is_macro", &self.is_macro).finish()
    }
}
