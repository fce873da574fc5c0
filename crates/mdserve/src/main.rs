//! mdserve CLI - Markdown-rendering file server.
//!
//! Provides commands for:
//! - `serve`: Serve a directory with Markdown rendered to HTML
//! - `index`: Print the directory index of a tree as JSON

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{IndexArgs, ServeArgs};
use error::CliError;
use output::Output;

/// mdserve - Serve Markdown as HTML.
#[derive(Parser)]
#[command(name = "mdserve", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a directory over HTTP.
    Serve(ServeArgs),
    /// Print the directory index as JSON.
    Index(IndexArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise RUST_LOG decides
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => run_serve(args),
        Commands::Index(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(args.execute())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::try_parse_from(["mdserve", "index", "--dir", "docs"]).unwrap();
        assert!(matches!(cli.command, Commands::Index(_)));

        let cli = Cli::try_parse_from(["mdserve", "serve", "--online"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve(_)));
    }
}
