//! Satchel - front-end asset bundler
//!
//! Command line entry point: parses arguments, sets up logging and dispatches
//! to the command implementations.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "satchel=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(cli.root, args),
        Commands::Scan(args) => commands::scan::run(cli.root, args),
        Commands::Show(args) => commands::show::run(cli.root, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
