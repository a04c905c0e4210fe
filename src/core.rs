//! The builtin namespace: native functions bound in the root environment,
//! plus a small prelude written in the language itself.

use std::{
    cell::RefCell,
    fs::read_to_string,
    io::{ErrorKind, Write},
    iter::once,
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    env::Env,
    eval::eval,
    printer::join,
    reader::read_str,
    types::{
        collection::{insert_pairs, map_from_pairs},
        AstNode, EvalError, EvalResult, Function, MapKey, ReplError,
    },
};

/// Where `prn` and `println` write
pub type Output = Rc<RefCell<dyn Write>>;

pub fn stdout() -> Output {
    Rc::new(RefCell::new(std::io::stdout()))
}

const PRELUDE: &[&str] = &[
    r#"(def! *host-language* "rust-ensemble")"#,
    "(def! not (fn* (a) (if a false true)))",
    r#"(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))"#,
    r#"(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw "odd number of forms to cond")) (cons 'cond (rest (rest xs)))))))"#,
];

fn arity<T>(name: &str, expected: &str, args: &[AstNode]) -> EvalResult<T> {
    Err(EvalError::arity(name, expected, args.len()).into())
}

fn wrong_type<T>(name: &str, expected: &'static str, got: &AstNode) -> EvalResult<T> {
    Err(EvalError::type_mismatch(name, expected, got).into())
}

fn numbers(name: &str, args: &[AstNode]) -> EvalResult<Vec<f64>> {
    args.iter()
        .map(|arg| match arg {
            AstNode::Number(n) => Ok(*n),
            other => wrong_type(name, "number", other),
        })
        .collect()
}

/// Sum of all arguments
pub fn add(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::Number(numbers("+", args)?.into_iter().sum()))
}

/// Subtract the rest of the arguments from the first; a single argument is negated
pub fn subtract(args: &[AstNode]) -> EvalResult {
    match numbers("-", args)?.split_first() {
        Some((first, [])) => Ok(AstNode::Number(-first)),
        Some((first, rest)) => Ok(AstNode::Number(rest.iter().fold(*first, |acc, n| acc - n))),
        None => arity("-", "at least 1", args),
    }
}

/// Product of all arguments
pub fn multiply(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::Number(numbers("*", args)?.into_iter().product()))
}

/// Divide the first argument by the rest; a single argument is inverted
pub fn divide(args: &[AstNode]) -> EvalResult {
    match numbers("/", args)?.split_first() {
        Some((first, [])) => Ok(AstNode::Number(1.0 / first)),
        Some((first, rest)) => Ok(AstNode::Number(rest.iter().fold(*first, |acc, n| acc / n))),
        None => arity("/", "at least 1", args),
    }
}

/// Structural equality of two values
pub fn equals(args: &[AstNode]) -> EvalResult {
    match args {
        [left, right] => Ok(AstNode::Bool(left == right)),
        _ => arity("=", "2", args),
    }
}

/// Makes each argument to their readable (escaped) string representation and joins them with spaces.
pub fn pr_dash_str(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::String(join(args, true, " ")))
}

/// Makes each argument to their string representation and concatenates them into a single string.
pub fn str(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::String(join(args, false, "")))
}

/// Strip leading and trailing whitespace from a string
pub fn trim(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::String(s), ..] => Ok(AstNode::String(s.trim().to_string())),
        [other, ..] => wrong_type("trim", "string", other),
        [] => arity("trim", "1", args),
    }
}

/// Print the elements of a sequence without escaping and join them with the
/// separator string, or a space when there is none
pub fn join_fn(args: &[AstNode]) -> EvalResult {
    let separator = match args.get(1) {
        Some(AstNode::String(sep)) => sep.as_str(),
        _ => " ",
    };
    match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _)]
        | [AstNode::List(items, _) | AstNode::Vector(items, _), _] => {
            Ok(AstNode::String(join(items, false, separator)))
        }
        [other] | [other, _] => wrong_type("join", "list or vector", other),
        _ => arity("join", "1 or 2", args),
    }
}

fn write_line(output: &Output, line: &str) -> EvalResult {
    let mut out = output.borrow_mut();
    writeln!(out, "{line}")
        .and_then(|_| out.flush())
        .map_err(|err| EvalError::Io(err.to_string()))?;
    Ok(AstNode::Nil)
}

/// Read a string and parse its first form
pub fn read_string(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::String(source), ..] => Ok(read_str(source)?),
        [other, ..] => wrong_type("read-string", "string", other),
        [] => arity("read-string", "1", args),
    }
}

/// Given a string path, return the contents of the file as a string
pub fn slurp(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::String(path), ..] => read_to_string(path).map(AstNode::String).map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::NotFound => format!("could not read file: {path} does not exist"),
                ErrorKind::PermissionDenied => {
                    format!("could not read file: no permission to open {path}")
                }
                _ => format!("could not read file {path}: {err}"),
            };
            EvalError::Io(reason).into()
        }),
        [other, ..] => wrong_type("slurp", "string", other),
        [] => arity("slurp", "1", args),
    }
}

/// Convert all arguments to a list
pub fn to_list(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::list(args.to_vec()))
}

/// Convert all arguments to a vector
pub fn to_vector(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::vector(args.to_vec()))
}

/// Check if first argument is empty
pub fn is_empty(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] => Ok(AstNode::Bool(items.is_empty())),
        [AstNode::Map(map, _), ..] => Ok(AstNode::Bool(map.is_empty())),
        [AstNode::String(s), ..] => Ok(AstNode::Bool(s.is_empty())),
        [AstNode::Nil, ..] => Ok(AstNode::Bool(true)),
        [other, ..] => wrong_type("empty?", "a collection", other),
        [] => arity("empty?", "1", args),
    }
}

/// Check the number of elements in first argument
pub fn count(args: &[AstNode]) -> EvalResult {
    let len = match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] => items.len(),
        [AstNode::Map(map, _), ..] => map.len(),
        [AstNode::String(s), ..] => s.chars().count(),
        [AstNode::Nil, ..] => 0,
        [other, ..] => return wrong_type("count", "a collection", other),
        [] => return arity("count", "1", args),
    };
    Ok(AstNode::Number(len as f64))
}

/// Prepend a value to a list or vector, producing a list
pub fn cons(args: &[AstNode]) -> EvalResult {
    match args {
        [head, AstNode::List(tail, _) | AstNode::Vector(tail, _), ..] => Ok(AstNode::list(
            once(head).chain(tail.iter()).cloned().collect(),
        )),
        [head, AstNode::Nil, ..] => Ok(AstNode::list(vec![head.clone()])),
        [_, other, ..] => wrong_type("cons", "list or vector", other),
        _ => arity("cons", "2", args),
    }
}

/// Join any number of lists and vectors into one list
pub fn concat(args: &[AstNode]) -> EvalResult {
    let mut joined = Vec::new();
    for arg in args {
        match arg {
            AstNode::List(items, _) | AstNode::Vector(items, _) => joined.extend(items.iter().cloned()),
            AstNode::Nil => {}
            other => return wrong_type("concat", "list or vector", other),
        }
    }
    Ok(AstNode::list(joined))
}

/// Convert a list into a vector
pub fn vec(args: &[AstNode]) -> EvalResult {
    match args {
        [vector @ AstNode::Vector(..), ..] => Ok(vector.clone()),
        [AstNode::List(items, _), ..] => Ok(AstNode::Vector(items.clone(), None)),
        [AstNode::Nil, ..] => Ok(AstNode::vector(vec![])),
        [other, ..] => wrong_type("vec", "list or vector", other),
        [] => arity("vec", "1", args),
    }
}

/// Element at a zero based index
pub fn nth(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(..) | AstNode::Vector(..), index @ AstNode::Number(n), ..] if n.fract() != 0.0 => {
            wrong_type("nth", "an integer index", index)
        }
        [AstNode::List(items, _) | AstNode::Vector(items, _), AstNode::Number(index), ..] => {
            let index = *index as i64;
            usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| {
                    EvalError::OutOfBounds {
                        name: String::from("nth"),
                        index,
                        len: items.len(),
                    }
                    .into()
                })
        }
        [AstNode::List(..) | AstNode::Vector(..), other, ..] => wrong_type("nth", "number", other),
        [other, _, ..] => wrong_type("nth", "list or vector", other),
        _ => arity("nth", "2", args),
    }
}

/// First element, or nil when there is none
pub fn first(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] => {
            Ok(items.first().cloned().unwrap_or_default())
        }
        [AstNode::Nil, ..] => Ok(AstNode::Nil),
        [other, ..] => wrong_type("first", "list or vector", other),
        [] => arity("first", "1", args),
    }
}

/// Everything after the first element, as a list
pub fn rest(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] => Ok(AstNode::list(
            items.iter().skip(1).cloned().collect(),
        )),
        [AstNode::Nil, ..] => Ok(AstNode::list(vec![])),
        [other, ..] => wrong_type("rest", "list or vector", other),
        [] => arity("rest", "1", args),
    }
}

/// Last element, or nil when there is none
pub fn last(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] => {
            Ok(items.last().cloned().unwrap_or_default())
        }
        [AstNode::Nil, ..] => Ok(AstNode::Nil),
        [other, ..] => wrong_type("last", "list or vector", other),
        [] => arity("last", "1", args),
    }
}

/// View a collection or string as a list; empty ones become nil
pub fn seq(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] if items.is_empty() => Ok(AstNode::Nil),
        [AstNode::List(items, _) | AstNode::Vector(items, _), ..] => Ok(AstNode::List(items.clone(), None)),
        [AstNode::String(s), ..] if s.is_empty() => Ok(AstNode::Nil),
        [AstNode::String(s), ..] => Ok(AstNode::list(
            s.chars().map(|c| AstNode::String(c.to_string())).collect(),
        )),
        [AstNode::Nil, ..] => Ok(AstNode::Nil),
        [other, ..] => wrong_type("seq", "a sequence or string", other),
        [] => arity("seq", "1", args),
    }
}

/// Add elements to a collection: lists grow at the front, vectors at the back
pub fn conj(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::List(items, _), extra @ ..] => Ok(AstNode::list(
            extra.iter().rev().chain(items.iter()).cloned().collect(),
        )),
        [AstNode::Vector(items, _), extra @ ..] => Ok(AstNode::vector(
            items.iter().chain(extra.iter()).cloned().collect(),
        )),
        [other, ..] => wrong_type("conj", "list or vector", other),
        [] => arity("conj", "at least 1", args),
    }
}

/// Call a function with the middle arguments followed by the elements of the last
pub fn apply_fn(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Function(func), middle @ .., AstNode::List(tail, _) | AstNode::Vector(tail, _)] => {
            let call_args: Vec<AstNode> = middle.iter().chain(tail.iter()).cloned().collect();
            func.call(&call_args)
        }
        [AstNode::Function(_)] => arity("apply", "at least 2", args),
        [AstNode::Function(_), .., other] => wrong_type("apply", "list or vector", other),
        [other, ..] => wrong_type("apply", "function", other),
        [] => arity("apply", "at least 2", args),
    }
}

/// Call a function on each element, collecting the results into a list
pub fn map_fn(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Function(func), AstNode::List(items, _) | AstNode::Vector(items, _), ..] => items
            .iter()
            .map(|item| func.call(std::slice::from_ref(item)))
            .collect::<EvalResult<Vec<_>>>()
            .map(AstNode::list),
        [AstNode::Function(_), other, ..] => wrong_type("map", "list or vector", other),
        [other, _, ..] => wrong_type("map", "function", other),
        _ => arity("map", "2", args),
    }
}

/// Build a map from alternating keys and values
pub fn to_hash_map(args: &[AstNode]) -> EvalResult {
    Ok(AstNode::map(map_from_pairs("hash-map", args)?))
}

/// Copy of a map with extra key/value pairs
pub fn assoc(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Map(map, _), pairs @ ..] => {
            let mut updated = (**map).clone();
            insert_pairs("assoc", &mut updated, pairs)?;
            Ok(AstNode::map(updated))
        }
        [other, ..] => wrong_type("assoc", "map", other),
        [] => arity("assoc", "at least 1", args),
    }
}

/// Copy of a map without the given keys
pub fn dissoc(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Map(map, _), keys @ ..] => {
            let mut updated = (**map).clone();
            for key in keys {
                updated.remove(&MapKey::from_node(key)?);
            }
            Ok(AstNode::map(updated))
        }
        [other, ..] => wrong_type("dissoc", "map", other),
        [] => arity("dissoc", "at least 1", args),
    }
}

/// Value stored under a key, or nil
pub fn get(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Map(map, _), key, ..] => {
            Ok(map.get(&MapKey::from_node(key)?).cloned().unwrap_or_default())
        }
        [AstNode::Nil, _, ..] => Ok(AstNode::Nil),
        [other, _, ..] => wrong_type("get", "map", other),
        _ => arity("get", "2", args),
    }
}

/// Check if a map has a key
pub fn contains(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Map(map, _), key, ..] => {
            Ok(AstNode::Bool(map.contains_key(&MapKey::from_node(key)?)))
        }
        [other, _, ..] => wrong_type("contains?", "map", other),
        _ => arity("contains?", "2", args),
    }
}

/// All keys of a map, as a list
pub fn keys(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Map(map, _), ..] => Ok(AstNode::list(map.keys().map(MapKey::to_node).collect())),
        [other, ..] => wrong_type("keys", "map", other),
        [] => arity("keys", "1", args),
    }
}

/// All values of a map, as a list
pub fn vals(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Map(map, _), ..] => Ok(AstNode::list(map.values().cloned().collect())),
        [other, ..] => wrong_type("vals", "map", other),
        [] => arity("vals", "1", args),
    }
}

/// Make a given value into an atom
pub fn to_atom(args: &[AstNode]) -> EvalResult {
    match args {
        [value, ..] => Ok(AstNode::atom(value.clone())),
        [] => arity("atom", "1", args),
    }
}

/// Current contents of an atom
pub fn deref(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Atom(cell), ..] => Ok(cell.borrow().clone()),
        [other, ..] => wrong_type("deref", "atom", other),
        [] => arity("deref", "1", args),
    }
}

/// Replace the contents of an atom, returning the new value
pub fn reset(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Atom(cell), value, ..] => {
            cell.replace(value.clone());
            Ok(value.clone())
        }
        [other, _, ..] => wrong_type("reset!", "atom", other),
        _ => arity("reset!", "2", args),
    }
}

/// Replace the contents of an atom with `(f current extra...)`
pub fn swap(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Atom(cell), AstNode::Function(func), extra @ ..] => {
            let call_args: Vec<AstNode> = once(cell.borrow().clone())
                .chain(extra.iter().cloned())
                .collect();
            let updated = func.call(&call_args)?;
            cell.replace(updated.clone());
            Ok(updated)
        }
        [AstNode::Atom(_), other, ..] => wrong_type("swap!", "function", other),
        [other, _, ..] => wrong_type("swap!", "atom", other),
        _ => arity("swap!", "at least 2", args),
    }
}

/// Metadata attached to a collection or function, nil when there is none
pub fn meta(args: &[AstNode]) -> EvalResult {
    match args {
        [value, ..] => match value.meta() {
            Some(meta) => Ok(meta),
            None => wrong_type("meta", "a collection or function", value),
        },
        [] => arity("meta", "1", args),
    }
}

/// Copy of a collection or function with new metadata
pub fn with_meta(args: &[AstNode]) -> EvalResult {
    match args {
        [value, meta, ..] => match value.with_meta(meta.clone()) {
            Some(tagged) => Ok(tagged),
            None => wrong_type("with-meta", "a collection or function", value),
        },
        _ => arity("with-meta", "2", args),
    }
}

/// Turn a string into a symbol
pub fn to_symbol(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::String(name), ..] => Ok(AstNode::symbol(name)),
        [sym @ AstNode::Symbol(_), ..] => Ok(sym.clone()),
        [other, ..] => wrong_type("symbol", "string", other),
        [] => arity("symbol", "1", args),
    }
}

/// Turn a string into a keyword
pub fn to_keyword(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::String(name), ..] if name.starts_with(':') => Ok(AstNode::Keyword(name.clone())),
        [AstNode::String(name), ..] => Ok(AstNode::Keyword(format!(":{name}"))),
        [keyword @ AstNode::Keyword(_), ..] => Ok(keyword.clone()),
        [other, ..] => wrong_type("keyword", "string", other),
        [] => arity("keyword", "1", args),
    }
}

/// Check if the first argument is a function that is not a macro
pub fn is_function(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Function(func), ..] => Ok(AstNode::Bool(!func.is_macro())),
        [_, ..] => Ok(AstNode::Bool(false)),
        [] => arity("fn?", "1", args),
    }
}

/// Check if the first argument is a macro
pub fn is_macro(args: &[AstNode]) -> EvalResult {
    match args {
        [AstNode::Function(func), ..] => Ok(AstNode::Bool(func.is_macro())),
        [_, ..] => Ok(AstNode::Bool(false)),
        [] => arity("macro?", "1", args),
    }
}

/// Raise the first argument as a condition
pub fn throw(args: &[AstNode]) -> EvalResult {
    match args {
        [value, ..] => Err(ReplError::throw(value.clone())),
        [] => arity("throw", "1", args),
    }
}

/// Wrap a value as an error without raising it
pub fn to_error(args: &[AstNode]) -> EvalResult {
    match args {
        [err @ AstNode::Error(_), ..] => Ok(err.clone()),
        [value, ..] => Ok(AstNode::error(value.clone())),
        [] => arity("error", "1", args),
    }
}

/// Milliseconds since the Unix epoch
pub fn time_ms(_args: &[AstNode]) -> EvalResult {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| EvalError::Io(err.to_string()))?;
    Ok(AstNode::Number(elapsed.as_millis() as f64))
}

/// Bind a native function under a name
macro_rules! set_core_fn {
    ($env:ident += $func:ident as $name:expr) => {
        $env.set($name, AstNode::function(Function::native($name, $func)));
    };
    ($env:ident += $func:ident) => {
        set_core_fn!($env += $func as stringify!($func))
    };
}

/// Bind a one argument predicate that checks the variant of its argument
macro_rules! set_predicate {
    ($env:ident += $name:expr, $pattern:pat) => {
        $env.set(
            $name,
            AstNode::function(Function::native($name, |args: &[AstNode]| match args {
                [value, ..] => Ok(AstNode::Bool(matches!(value, $pattern))),
                [] => arity($name, "1", args),
            })),
        );
    };
}

/// Bind a binary numeric comparison
macro_rules! set_compare_op {
    ($env:ident += $name:expr, $op:path) => {
        $env.set(
            $name,
            AstNode::function(Function::native($name, |args: &[AstNode]| match args {
                [AstNode::Number(left), AstNode::Number(right)] => {
                    Ok(AstNode::Bool($op(left, right)))
                }
                [AstNode::Number(_), other] | [other, _] => wrong_type($name, "number", other),
                _ => arity($name, "2", args),
            })),
        );
    };
}

/// Create the root environment with every builtin bound.
///
/// `prn` and `println` write to `output`.
pub fn namespace(output: Output) -> Result<Env, ReplError> {
    let env = Env::new(None);

    set_core_fn!(env += add as "+");
    set_core_fn!(env += subtract as "-");
    set_core_fn!(env += multiply as "*");
    set_core_fn!(env += divide as "/");
    set_compare_op!(env += "<", PartialOrd::lt);
    set_compare_op!(env += "<=", PartialOrd::le);
    set_compare_op!(env += ">", PartialOrd::gt);
    set_compare_op!(env += ">=", PartialOrd::ge);
    set_core_fn!(env += equals as "=");

    set_core_fn!(env += pr_dash_str as "pr-str");
    set_core_fn!(env += str);
    set_core_fn!(env += trim);
    set_core_fn!(env += join_fn as "join");
    let prn_output = output.clone();
    env.set(
        "prn",
        AstNode::function(Function::native("prn", move |args| {
            write_line(&prn_output, &join(args, true, " "))
        })),
    );
    env.set(
        "println",
        AstNode::function(Function::native("println", move |args| {
            write_line(&output, &join(args, false, " "))
        })),
    );
    set_core_fn!(env += read_string as "read-string");
    set_core_fn!(env += slurp);
    let root = env.clone();
    env.set(
        "eval",
        AstNode::function(Function::native("eval", move |args| match args {
            [ast, ..] => eval(ast.clone(), root.clone()),
            [] => arity("eval", "1", args),
        })),
    );

    set_core_fn!(env += to_list as "list");
    set_core_fn!(env += to_vector as "vector");
    set_predicate!(env += "list?", AstNode::List(..));
    set_predicate!(env += "vector?", AstNode::Vector(..));
    set_predicate!(env += "sequential?", AstNode::List(..) | AstNode::Vector(..));
    set_core_fn!(env += is_empty as "empty?");
    set_core_fn!(env += count);
    set_core_fn!(env += cons);
    set_core_fn!(env += concat);
    set_core_fn!(env += vec);
    set_core_fn!(env += nth);
    set_core_fn!(env += first);
    set_core_fn!(env += rest);
    set_core_fn!(env += last);
    set_core_fn!(env += seq);
    set_core_fn!(env += conj);
    set_core_fn!(env += apply_fn as "apply");
    set_core_fn!(env += map_fn as "map");

    set_core_fn!(env += to_hash_map as "hash-map");
    set_predicate!(env += "map?", AstNode::Map(..));
    set_core_fn!(env += assoc);
    set_core_fn!(env += dissoc);
    set_core_fn!(env += get);
    set_core_fn!(env += contains as "contains?");
    set_core_fn!(env += keys);
    set_core_fn!(env += vals);

    set_core_fn!(env += to_atom as "atom");
    set_predicate!(env += "atom?", AstNode::Atom(_));
    set_core_fn!(env += deref);
    set_core_fn!(env += reset as "reset!");
    set_core_fn!(env += swap as "swap!");

    set_predicate!(env += "nil?", AstNode::Nil);
    set_predicate!(env += "true?", AstNode::Bool(true));
    set_predicate!(env += "false?", AstNode::Bool(false));
    set_core_fn!(env += to_symbol as "symbol");
    set_predicate!(env += "symbol?", AstNode::Symbol(_));
    set_core_fn!(env += to_keyword as "keyword");
    set_predicate!(env += "keyword?", AstNode::Keyword(_));
    set_predicate!(env += "string?", AstNode::String(_));
    set_predicate!(env += "number?", AstNode::Number(_));
    set_core_fn!(env += is_function as "fn?");
    set_core_fn!(env += is_macro as "macro?");
    set_core_fn!(env += meta);
    set_core_fn!(env += with_meta as "with-meta");

    set_core_fn!(env += throw);
    set_core_fn!(env += to_error as "error");
    set_predicate!(env += "error?", AstNode::Error(_));
    set_core_fn!(env += time_ms as "time-ms");

    env.set("*ARGV*", AstNode::list(vec![]));
    load_prelude(&env)?;
    Ok(env)
}

/// Definitions written in the language itself
fn load_prelude(env: &Env) -> Result<(), ReplError> {
    for source in PRELUDE {
        eval(read_str(source)?, env.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::printer::pr_str;

    fn sink() -> Rc<RefCell<Vec<u8>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn rep(env: &Env, line: &str) -> EvalResult<String> {
        Ok(pr_str(&eval(read_str(line)?, env.clone())?, true))
    }

    #[test_case("(+ 1 2 3)", "6" ; "add is variadic")]
    #[test_case("(+)", "0" ; "empty sum")]
    #[test_case("(- 10 2 3)", "5" ; "subtract folds left")]
    #[test_case("(- 4)", "-4" ; "unary minus")]
    #[test_case("(/ 10 4)", "2.5" ; "divide")]
    #[test_case("(* 2 3 4)", "24" ; "multiply")]
    #[test_case("(<= 2 2)", "true" ; "less or equal")]
    #[test_case("(> 1 2)", "false" ; "greater")]
    #[test_case("(= [1 2] (list 1 2))", "true" ; "list equals vector")]
    #[test_case("(= {:a 1} {:a 1})", "true" ; "maps compare by value")]
    #[test_case("(= \"a\" :a)", "false" ; "string is not keyword")]
    #[test_case("(not nil)", "true" ; "not")]
    #[test_case("(count [1 2 3])", "3" ; "count vector")]
    #[test_case("(count nil)", "0" ; "count nil")]
    #[test_case("(empty? ())", "true" ; "empty list")]
    #[test_case("(cons 1 [2 3])", "(1 2 3)" ; "cons onto vector")]
    #[test_case("(concat [1] (list 2) [])", "(1 2)" ; "concat")]
    #[test_case("(vec (list 1 2))", "[1 2]" ; "vec")]
    #[test_case("(nth [1 2 3] 2)", "3" ; "nth")]
    #[test_case("(first ())", "nil" ; "first of empty")]
    #[test_case("(rest [1 2 3])", "(2 3)" ; "rest")]
    #[test_case("(last [1 2 3])", "3" ; "last")]
    #[test_case("(seq \"ab\")", r#"("a" "b")"# ; "seq of string")]
    #[test_case("(seq [])", "nil" ; "seq of empty")]
    #[test_case("(conj (list 1) 2 3)", "(3 2 1)" ; "conj list")]
    #[test_case("(conj [1] 2 3)", "[1 2 3]" ; "conj vector")]
    #[test_case("(apply + 1 [2 3])", "6" ; "apply")]
    #[test_case("(map (fn* (x) (* x x)) [1 2 3])", "(1 4 9)" ; "map closure")]
    #[test_case("(get (assoc {} :a 1) :a)", "1" ; "assoc then get")]
    #[test_case("(contains? (dissoc {:a 1} :a) :a)", "false" ; "dissoc")]
    #[test_case("(get nil :a)", "nil" ; "get from nil")]
    #[test_case("(keys {:a 1})", "(:a)" ; "keys")]
    #[test_case("(vals {\"k\" 2})", "(2)" ; "vals")]
    #[test_case("(keyword \"k\")", ":k" ; "keyword from string")]
    #[test_case("(symbol \"s\")", "s" ; "symbol from string")]
    #[test_case("(read-string \"(1 2)\")", "(1 2)" ; "read string")]
    #[test_case("(eval (list + 1 2))", "3" ; "eval")]
    #[test_case("(str \"a\" 1 :k)", r#""a1:k""# ; "str")]
    #[test_case("(pr-str \"a\" 1)", r#""\"a\" 1""# ; "pr-str")]
    #[test_case("(cond false 1 true 2)", "2" ; "cond macro")]
    #[test_case("(cond false 1)", "nil" ; "cond without match")]
    #[test_case("*host-language*", r#""rust-ensemble""# ; "host language")]
    #[test_case("(fn? +)", "true" ; "native is a function")]
    #[test_case("(error? (error 1))", "true" ; "error constructor")]
    #[test_case("(number? (time-ms))", "true" ; "time in millis")]
    #[test_case(r#"(trim "  a b \n")"#, r#""a b""# ; "trim")]
    #[test_case("(join (list 1 2))", r#""1 2""# ; "join with default separator")]
    #[test_case(r#"(join ["a" :b] ", ")"#, r#""a, :b""# ; "join with separator")]
    #[test_case("(join [])", r#""""# ; "join empty")]
    #[test_case("(meta [1])", "nil" ; "no metadata")]
    #[test_case("(meta (with-meta [1] {:a 1}))", "{:a 1}" ; "vector metadata")]
    #[test_case("(meta ^{:a 1} (list 1))", "{:a 1}" ; "reader metadata")]
    #[test_case("^{:a 1} [1 2]", "[1 2]" ; "metadata does not print")]
    #[test_case("(meta (with-meta (fn* (a) a) \"doc\"))", r#""doc""# ; "function metadata")]
    #[test_case("(meta (with-meta {} 1))", "1" ; "map metadata")]
    #[test_case("(= [1] (with-meta [1] 2))", "true" ; "metadata is ignored by equality")]
    fn builtins(line: &str, expected: &str) {
        let env = namespace(sink()).expect("namespace loads");
        assert_eq!(rep(&env, line).expect("evaluates"), expected);
    }

    #[test]
    fn atoms_are_shared_and_swappable() {
        let env = namespace(sink()).expect("namespace loads");
        rep(&env, "(def! a (atom 1))").expect("defines");
        rep(&env, "(def! b a)").expect("defines");
        assert_eq!(rep(&env, "(swap! a + 2)").expect("swaps"), "3");
        assert_eq!(rep(&env, "@b").expect("derefs"), "3");
        assert_eq!(rep(&env, "(reset! b 9)").expect("resets"), "9");
        assert_eq!(rep(&env, "(deref a)").expect("derefs"), "9");
    }

    #[test]
    fn printing_goes_to_the_output() {
        let out = sink();
        let env = namespace(out.clone()).expect("namespace loads");
        assert_eq!(rep(&env, r#"(prn "a" 1)"#).expect("prints"), "nil");
        rep(&env, r#"(println "a" 1)"#).expect("prints");
        let printed = String::from_utf8(out.borrow().clone()).expect("utf8");
        assert_eq!(printed, "\"a\" 1\na 1\n");
    }

    #[test_case("(+ 1 \"a\")" ; "add a string")]
    #[test_case("(< 1 nil)" ; "compare nil")]
    #[test_case("(first 1)" ; "first of number")]
    #[test_case("(deref 1)" ; "deref number")]
    #[test_case("(trim 1)" ; "trim number")]
    #[test_case("(join 1)" ; "join number")]
    #[test_case("(meta 1)" ; "meta of number")]
    #[test_case("(with-meta :k 1)" ; "metadata on keyword")]
    #[test_case("(nth [1 2] 1.5)" ; "fractional index")]
    fn type_errors(line: &str) {
        let env = namespace(sink()).expect("namespace loads");
        assert!(matches!(rep(&env, line), Err(ReplError::Eval(EvalError::Type { .. }))));
    }

    #[test_case("(nth [1] 3)", 3 ; "past the end")]
    #[test_case("(nth [1 2] -1)", -1 ; "negative")]
    fn nth_out_of_range(line: &str, expected: i64) {
        let env = namespace(sink()).expect("namespace loads");
        match rep(&env, line) {
            Err(ReplError::Eval(err @ EvalError::OutOfBounds { index, len, .. })) => {
                assert_eq!(index, expected);
                assert_eq!(
                    err.to_string(),
                    format!("nth: index {expected} out of bounds for length {len}")
                );
            }
            other => panic!("expected an out of bounds error, got {other:?}"),
        }
    }

    #[test]
    fn with_meta_leaves_the_original_alone() {
        let env = namespace(sink()).expect("namespace loads");
        rep(&env, "(def! f (fn* (a) a))").expect("defines");
        rep(&env, "(def! g (with-meta f {:tag 1}))").expect("defines");
        assert_eq!(rep(&env, "(meta f)").expect("evaluates"), "nil");
        assert_eq!(rep(&env, "(meta g)").expect("evaluates"), "{:tag 1}");
        assert_eq!(rep(&env, "(g 7)").expect("calls"), "7");
    }

    #[test]
    fn cond_with_odd_forms_throws() {
        let env = namespace(sink()).expect("namespace loads");
        assert_eq!(
            rep(&env, "(cond true)"),
            Err(ReplError::throw(AstNode::String(
                "odd number of forms to cond".to_string()
            )))
        );
    }

    #[test]
    fn slurp_missing_file_is_io_error() {
        let env = namespace(sink()).expect("namespace loads");
        assert!(matches!(
            rep(&env, r#"(slurp "/definitely/not/here.mal")"#),
            Err(ReplError::Eval(EvalError::Io(_)))
        ));
    }
}
