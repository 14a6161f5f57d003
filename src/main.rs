//! Sur CLI - Stem Shaping Pipeline
//!
//! Command-line interface for the Sur stem shaping pipeline.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use sur::cli::{commands, Cli, Commands};
use sur::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Sur v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Shape {
            path,
            stem,
            output_dir,
            json,
        } => {
            let shaper = commands::load_shaper(cli.config.as_deref())?;
            commands::shape(&shaper, &path, &stem, output_dir.as_deref(), json)
        }
        Commands::Derive {
            other,
            output_dir,
            stems,
        } => {
            let shaper = commands::load_shaper(cli.config.as_deref())?;
            commands::derive(&shaper, &other, &output_dir, &stems).map(|_| ())
        }
        Commands::Analyze { path, cutoff } => commands::analyze(&path, cutoff),
        Commands::Stems => {
            commands::list_stems();
            Ok(())
        }
    }
}
