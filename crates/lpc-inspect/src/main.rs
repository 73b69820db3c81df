//! LPC Inspect CLI entry point

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lpc_core::CoreConfig;
use lpc_inspect::{Cli, ExitCode};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(CoreConfig::load_from) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("Warning: Config error: {e}");
            eprintln!("Using default configuration.");
            CoreConfig::default()
        }
        None => CoreConfig::default(),
    };

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.execute_with_config(config) {
        Ok(code) => code.to_exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::GeneralError.to_exit_code()
        }
    }
}
