//! Run a Lithium script from a file path argument, or from stdin when none
//! is given.

use std::io::Read;
use std::process::ExitCode;

use lithium::{Diagnostic, Interpreter};
use tracing::{error, info};

fn read_source() -> std::io::Result<(String, String)> {
    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(path) => {
            info!(path = %path, "loading source from file");
            let source = std::fs::read_to_string(&path)?;
            Ok((source, path))
        }
        None => {
            info!("loading source from stdin");
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok((source, "<stdin>".to_string()))
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (source, origin) = match read_source() {
        Ok(pair) => pair,
        Err(err) => {
            error!(%err, "failed to read source");
            return ExitCode::FAILURE;
        }
    };

    info!(%origin, "running program");
    let mut interp = Interpreter::new();
    match interp.run(&source) {
        Ok(_) => {
            info!("program finished successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let diagnostic = Diagnostic::from_error(&err, &source);
            eprint!("{diagnostic}");
            error!(%err, "program aborted");
            ExitCode::FAILURE
        }
    }
}
