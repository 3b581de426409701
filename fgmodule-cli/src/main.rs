//! fgmodule CLI - Command-line interface
//!
//! Builds Fantasy Grounds modules from a directory of images.

mod commands;
mod error;
mod logging;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::build::BuildArgs;
use commands::common::ModuleArgs;

#[derive(Debug, Parser)]
#[command(name = "fgmodule", version, about = "Package images into Fantasy Grounds modules")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write db.xml and definition.xml, then zip the output directory
    Build(BuildArgs),

    /// Print the catalog that would be written, without writing it
    Catalog(ModuleArgs),

    /// Print the version the next build will use
    Version(ModuleArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!(verbosity = cli.verbose, "Logging initialized");

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Catalog(args) => commands::catalog::run(args),
        Commands::Version(args) => commands::version::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
