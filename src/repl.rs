//! This module holds all functionality for the REPL (Read-Eval-Print-Loop).

use miette::IntoDiagnostic;
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::{debug, warn};

use crate::{
    config::ReplConfig,
    core::{namespace, stdout, Output},
    env::Env,
    eval::eval,
    printer::pr_str,
    reader::read_str,
    types::{AstNode, ReplError},
};

/// A persistent root environment together with the settings for the interactive loop
pub struct Repl {
    env: Env,
    config: ReplConfig,
}

impl Repl {
    /// Builtins print to standard output
    pub fn new(config: ReplConfig) -> Result<Self, ReplError> {
        Self::with_output(config, stdout())
    }

    pub fn with_output(config: ReplConfig, output: Output) -> Result<Self, ReplError> {
        Ok(Repl {
            env: namespace(output)?,
            config,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Read, evaluate and print a single line
    pub fn rep(&self, line: &str) -> Result<String, ReplError> {
        let ast = read_str(line)?;
        let value = eval(ast, self.env.clone())?;
        Ok(pr_str(&value, true))
    }

    /// Bind the script arguments as strings in `*ARGV*`
    pub fn set_argv(&self, args: impl IntoIterator<Item = String>) {
        let argv = args.into_iter().map(AstNode::String).collect();
        self.env.set("*ARGV*", AstNode::list(argv));
    }

    /// Evaluate every form of a file through `load-file`
    pub fn load_file(&self, path: &str) -> Result<AstNode, ReplError> {
        let call = AstNode::list(vec![
            AstNode::symbol("load-file"),
            AstNode::String(path.to_string()),
        ]);
        eval(call, self.env.clone())
    }

    /// Run the interactive loop until end of input
    pub fn run(&self) -> miette::Result<()> {
        let mut rl = DefaultEditor::new().into_diagnostic()?;
        if let Some(path) = &self.config.history_file {
            if let Err(err) = rl.load_history(path) {
                debug!(path = %path.display(), %err, "no history loaded");
            }
        }
        if self.config.banner {
            if let Err(err) = self.rep(r#"(println (str "Mal [" *host-language* "]"))"#) {
                report(err);
            }
        }
        loop {
            let line = match rl.readline(&self.config.prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    warn!(%err, "could not read line");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            rl.add_history_entry(line.as_str()).into_diagnostic()?;
            match self.rep(&line) {
                Ok(out) => println!("{out}"),
                Err(err) => report(err),
            }
        }
        if let Some(path) = &self.config.history_file {
            if let Err(err) = rl.save_history(path) {
                warn!(path = %path.display(), %err, "could not save history");
            }
        }
        Ok(())
    }
}

/// Render an error to stderr
pub fn report(err: ReplError) {
    eprintln!("{:?}", err.into_report());
}
