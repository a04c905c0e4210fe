use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::types::{AstNode, EvalError};

#[derive(Default)]
struct EnvStruct {
    /// The parent context (outer environment) - at most one
    outer: Option<Env>,
    /// A symbol table mapping names to values
    data: RefCell<HashMap<String, AstNode>>,
}

/// A lexical scope. Cloning shares the same frame.
#[derive(Clone, Default)]
pub struct Env(Rc<EnvStruct>);

impl Env {
    pub fn new(outer: Option<Env>) -> Self {
        Env(Rc::new(EnvStruct {
            outer,
            data: RefCell::default(),
        }))
    }

    /// Create a child scope binding `binds` positionally to `exprs`.
    ///
    /// A `&` in `binds` binds the following name to a list of the remaining
    /// expressions. Extra expressions without a parameter are ignored.
    pub fn with_bindings(
        outer: Option<Env>,
        binds: &[String],
        exprs: &[AstNode],
    ) -> Result<Env, EvalError> {
        let env = Env::new(outer);
        for (idx, bind) in binds.iter().enumerate() {
            if bind == "&" {
                if let Some(rest) = binds.get(idx + 1) {
                    let value = exprs.get(idx..).map(<[AstNode]>::to_vec).unwrap_or_default();
                    env.set(rest, AstNode::list(value));
                }
                break;
            }
            match exprs.get(idx) {
                Some(expr) => {
                    env.set(bind, expr.clone());
                }
                None => {
                    let required = binds.iter().take_while(|b| *b != "&").count();
                    let expected = if required < binds.len() {
                        format!("at least {required}")
                    } else {
                        required.to_string()
                    };
                    return Err(EvalError::arity("fn", expected, exprs.len()));
                }
            }
        }
        Ok(env)
    }

    pub fn outer(&self) -> Option<Env> {
        self.0.outer.clone()
    }

    /// Bind in this frame only, replacing any previous binding. Returns the value.
    pub fn set(&self, key: &str, val: AstNode) -> AstNode {
        self.0.data.borrow_mut().insert(key.to_string(), val.clone());
        val
    }

    /// Nearest scope, starting at this one, that binds `key`
    pub fn find(&self, key: &str) -> Option<Env> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            if env.0.data.borrow().contains_key(key) {
                return Some(env);
            }
            current = env.outer();
        }
        None
    }

    pub fn get(&self, key: &str) -> Result<AstNode, EvalError> {
        self.find(key)
            .and_then(|env| env.0.data.borrow().get(key).cloned())
            .ok_or_else(|| EvalError::NotFound(key.to_string()))
    }

    /// The outermost scope of this chain
    pub fn root(&self) -> Env {
        let mut env = self.clone();
        while let Some(outer) = env.outer() {
            env = outer;
        }
        env
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.0.data.borrow();
        let mut symbols: Vec<&String> = data.keys().collect();
        symbols.sort();
        f.debug_struct("Env")
            .field("symbols", &symbols)
            .field("outer", &self.0.outer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn nums(list: &[f64]) -> Vec<AstNode> {
        list.iter().copied().map(AstNode::Number).collect()
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let outer = Env::new(None);
        outer.set("x", AstNode::Number(1.0));
        let inner = Env::new(Some(outer.clone()));
        inner.set("x", AstNode::Number(2.0));
        assert_eq!(inner.get("x"), Ok(AstNode::Number(2.0)));
        assert_eq!(outer.get("x"), Ok(AstNode::Number(1.0)));
    }

    #[test]
    fn lookup_walks_outward() {
        let outer = Env::new(None);
        outer.set("y", AstNode::Bool(true));
        let inner = Env::new(Some(Env::new(Some(outer))));
        assert_eq!(inner.get("y"), Ok(AstNode::Bool(true)));
    }

    #[test]
    fn missing_symbol_is_not_found() {
        let env = Env::new(None);
        assert_eq!(env.find("z").map(|_| ()), None);
        assert_eq!(env.get("z"), Err(EvalError::NotFound("z".to_string())));
    }

    #[test_case(&["a", "&", "rest"], &[1.0, 2.0, 3.0], &[2.0, 3.0] ; "rest takes remaining")]
    #[test_case(&["a", "&", "rest"], &[1.0], &[] ; "rest may be empty")]
    #[test_case(&["&", "rest"], &[], &[] ; "only rest")]
    fn variadic_binding(binds: &[&str], exprs: &[f64], rest: &[f64]) {
        let env = Env::with_bindings(None, &names(binds), &nums(exprs)).expect("binds");
        assert_eq!(env.get("rest"), Ok(AstNode::list(nums(rest))));
    }

    #[test_case(&[1.0] ; "nothing left over")]
    #[test_case(&[1.0, 2.0] ; "leftovers are dropped")]
    fn ampersand_without_a_name(exprs: &[f64]) {
        let env = Env::with_bindings(None, &names(&["a", "&"]), &nums(exprs)).expect("binds");
        assert_eq!(env.get("a"), Ok(AstNode::Number(1.0)));
        assert_eq!(env.find("&").map(|_| ()), None);
    }

    #[test]
    fn too_few_arguments_is_an_arity_error() {
        let err = Env::with_bindings(None, &names(&["a", "b"]), &nums(&[1.0])).unwrap_err();
        assert!(matches!(err, EvalError::Arity { got: 1, .. }));
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let env = Env::with_bindings(None, &names(&["a"]), &nums(&[1.0, 2.0])).expect("binds");
        assert_eq!(env.get("a"), Ok(AstNode::Number(1.0)));
    }

    #[test]
    fn set_replaces_in_the_same_frame() {
        let env = Env::new(None);
        env.set("x", AstNode::Nil);
        assert_eq!(env.set("x", AstNode::Number(3.0)), AstNode::Number(3.0));
        assert_eq!(env.get("x"), Ok(AstNode::Number(3.0)));
    }
}
