//! Agudo CLI - restore high-frequency content to band-limited audio.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agudo")]
#[command(author, version, about = "Harmonic bandwidth extension for audio files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore high frequencies to a low-passed or compressed file
    Restore(commands::restore::RestoreArgs),

    /// Show WAV file metadata
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Restore(args) => commands::restore::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_valid() {
        Cli::command().debug_assert();
    }
}
