//! Runs the `.mal` files under `tests/fixtures`.
//!
//! Each non-comment line is evaluated in one shared session. A following
//! `;=>text` line gives the printed result; `;/regex` lines match the lines the
//! form printed, in order, or the error message when it printed nothing.

use std::{cell::RefCell, fs, path::Path, rc::Rc};

use ensemble::{config::ReplConfig, Repl};
use regex::Regex;
use test_case::test_case;

fn run_fixture(name: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let source = fs::read_to_string(&path).expect("fixture exists");
    let output = Rc::new(RefCell::new(Vec::<u8>::new()));
    let repl = Repl::with_output(ReplConfig::default(), output.clone()).expect("namespace loads");

    let mut result: Option<Result<String, String>> = None;
    let mut printed_index = 0;
    for (number, line) in source.lines().enumerate() {
        let location = format!("{name}:{}", number + 1);
        if let Some(expected) = line.strip_prefix(";=>") {
            match &result {
                Some(Ok(actual)) => assert_eq!(actual, expected, "{location}"),
                Some(Err(err)) => panic!("{location}: expected {expected}, got error {err}"),
                None => panic!("{location}: nothing was evaluated"),
            }
        } else if let Some(pattern) = line.strip_prefix(";/") {
            let re = Regex::new(pattern).expect("valid pattern");
            let printed = String::from_utf8_lossy(&output.borrow()).into_owned();
            let text = match (printed.lines().nth(printed_index), &result) {
                (Some(text), _) => text.to_string(),
                (None, Some(Err(err))) => err.clone(),
                (None, _) => panic!("{location}: nothing printed for /{pattern}/"),
            };
            assert!(re.is_match(&text), "{location}: {text:?} does not match /{pattern}/");
            printed_index += 1;
        } else if line.trim().is_empty() || line.starts_with(';') {
            continue;
        } else {
            output.borrow_mut().clear();
            printed_index = 0;
            result = Some(repl.rep(line).map_err(|err| err.to_string()));
        }
    }
}

#[test_case("reader.mal" ; "reader")]
#[test_case("env.mal" ; "environments")]
#[test_case("special_forms.mal" ; "special forms")]
#[test_case("tco.mal" ; "tail calls")]
#[test_case("quasiquote.mal" ; "quasiquote")]
#[test_case("macros.mal" ; "macros")]
#[test_case("try.mal" ; "try catch")]
#[test_case("builtins.mal" ; "builtins")]
fn fixture(name: &str) {
    run_fixture(name);
}
