use ensemble::{config::ReplConfig, repl::Repl, ReplError};
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let repl = Repl::new(ReplConfig::from_env()).map_err(ReplError::into_report)?;
    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(script) => {
            repl.set_argv(args);
            repl.load_file(&script).map_err(ReplError::into_report)?;
            Ok(())
        }
        None => repl.run(),
    }
}
