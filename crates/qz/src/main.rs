//! QZ CLI - markdown quizzes to Moodle XML.
//!
//! Provides commands for:
//! - `convert`: Convert a quiz file into one Moodle XML file per section

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ConvertArgs;
use output::Output;

/// QZ - Markdown quiz to Moodle XML converter.
#[derive(Parser)]
#[command(name = "qz", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a markdown quiz to Moodle XML.
    Convert(ConvertArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --debug traces the parser, --verbose enables INFO, otherwise RUST_LOG
    let filter = match &cli.command {
        Commands::Convert(args) if args.debug => EnvFilter::new("info,qz_core=trace"),
        Commands::Convert(args) if args.verbose => EnvFilter::new("info"),
        Commands::Convert(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
