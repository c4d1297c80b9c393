mod categories;
mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exrmerge", about = "Merge or split EXR channels across frame sequences")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the channels of EXR files, grouped by category
    Info(commands::info::InfoArgs),
    /// Merge selected channels of each frame into one output per frame
    Merge(commands::merge::MergeArgs),
    /// Print or save a sample batch config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Merge(args) => commands::merge::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
