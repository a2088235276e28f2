mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{matching, overlay, run as pipeline};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins; otherwise `-v` raises the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Match(args) => matching::run(&cli, args),
        Commands::Overlay(args) => overlay::run(&cli, args),
        Commands::Run(args) => pipeline::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
