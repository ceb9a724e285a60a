//! quadtile CLI - inspect and load quadtree tiles.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use quadtile::logging::{default_log_dir, default_log_file, init_console_logging, init_logging};

use commands::fetch::FetchArgs;
use commands::info::InfoArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "quadtile")]
#[command(version, about = "Inspect and load quadtree map tiles", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to logs/quadtile.log (level from RUST_LOG)
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a tile's coordinate, bounds, geometry and URL
    Info(InfoArgs),
    /// Load a tile from a tile server and optionally save its texture
    Fetch(FetchArgs),
}

fn main() {
    let cli = Cli::parse();

    let _guard = if cli.log_file {
        match init_logging(default_log_dir(), default_log_file()) {
            Ok(guard) => Some(guard),
            Err(e) => CliError::LoggingInit(e.to_string()).exit(),
        }
    } else {
        init_console_logging(cli.verbose);
        None
    };

    let result = match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Fetch(args) => commands::fetch::run(args),
    };

    if let Err(e) = result {
        e.exit();
    }
}
