//! TileHarvest CLI - Command-line interface
//!
//! This binary provides a command-line interface to the TileHarvest library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use tileharvest::run::{DEFAULT_ZOOM_MAX, DEFAULT_ZOOM_MIN};

use commands::config::ConfigCommands;
use commands::download::DownloadArgs;

#[derive(Parser)]
#[command(name = "tileharvest")]
#[command(version = tileharvest::VERSION)]
#[command(about = "Download map tiles covering a named region", long_about = None)]
struct Cli {
    /// Enable debug-level logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known regions with their bounds
    Regions,

    /// Show how many tiles a region covers at each zoom level
    Tiles {
        /// Region name (see `tileharvest regions`)
        #[arg(long)]
        region: String,

        /// Lowest zoom level
        #[arg(long, default_value_t = DEFAULT_ZOOM_MIN)]
        zoom_min: u8,

        /// Highest zoom level
        #[arg(long, default_value_t = DEFAULT_ZOOM_MAX)]
        zoom_max: u8,
    },

    /// Download every tile covering a region
    ///
    /// Tiles already on disk are skipped, so an interrupted download can be
    /// resumed by running the same command again. Press Ctrl-C to stop
    /// admitting new tiles; tiles in flight still finish.
    Download {
        /// Region name (see `tileharvest regions`)
        #[arg(long)]
        region: String,

        /// Lowest zoom level
        #[arg(long, default_value_t = DEFAULT_ZOOM_MIN)]
        zoom_min: u8,

        /// Highest zoom level
        #[arg(long, default_value_t = DEFAULT_ZOOM_MAX)]
        zoom_max: u8,

        /// Maximum simultaneous requests (default from config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Retries per tile after the first attempt (default from config)
        #[arg(long)]
        max_retries: Option<u32>,

        /// Base backoff delay in seconds, doubled on each retry (default from config)
        #[arg(long, value_name = "SECS")]
        retry_delay: Option<f64>,
    },

    /// Show per-zoom statistics of downloaded tiles
    Stats,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Regions => commands::regions::run(),
        Commands::Tiles {
            region,
            zoom_min,
            zoom_max,
        } => commands::tiles::run(&region, zoom_min, zoom_max),
        Commands::Download {
            region,
            zoom_min,
            zoom_max,
            concurrency,
            max_retries,
            retry_delay,
        } => {
            commands::download::run(
                DownloadArgs {
                    region,
                    zoom_min,
                    zoom_max,
                    concurrency,
                    max_retries,
                    retry_delay,
                },
                cli.debug,
            )
            .await
        }
        Commands::Stats => commands::stats::run(cli.debug).await,
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
