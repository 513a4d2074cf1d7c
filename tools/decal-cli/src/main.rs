//! Decal CLI: fit, compose, and export sticker overlays.
//!
//! Usage:
//!   decal fit <IMAGE>          Show how an image fits the stage
//!   decal compose <BASE>       Place a sticker and export the result
//!   decal gallery              List available stickers
//!   decal info <IMAGE>         Show image information
//!   decal check                Check export and share capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use decal_common::config::{AppConfig, ResizeFilter};
use decal_model::geometry::Dimensions;

mod commands;

#[derive(Parser)]
#[command(
    name = "decal",
    about = "Put stickers on pictures and export the result",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the display size an image gets inside the stage
    Fit {
        /// Image to measure
        image: PathBuf,

        /// Stage size, e.g. 476x300
        #[arg(long)]
        container: Option<Dimensions>,
    },

    /// Place a sticker on a base image and export it
    Compose {
        /// Base image
        base: PathBuf,

        /// Custom sticker file
        #[arg(long, conflicts_with = "sticker")]
        overlay: Option<PathBuf>,

        /// Built-in sticker id (see `decal gallery`)
        #[arg(long)]
        sticker: Option<u32>,

        /// Horizontal sticker offset in display pixels
        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,

        /// Vertical sticker offset in display pixels
        #[arg(long, allow_hyphen_values = true)]
        y: Option<f64>,

        /// Sticker offset as a style transform, e.g. "translateX(12px) translateY(5px)"
        #[arg(long, conflicts_with_all = ["x", "y"])]
        transform: Option<String>,

        /// Stage size, e.g. 476x300
        #[arg(long)]
        container: Option<Dimensions>,

        /// Hand the result to the share helper instead of saving it
        #[arg(long)]
        share: bool,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Export at the base image's native resolution
        #[arg(long)]
        native: bool,

        /// Resampling filter: nearest|triangle|catmull_rom|lanczos3
        #[arg(long)]
        filter: Option<ResizeFilter>,
    },

    /// List stickers, optionally adding custom ones
    Gallery {
        /// Sticker files to add
        #[arg(long, num_args = 1..)]
        add: Vec<PathBuf>,
    },

    /// Show image information
    Info {
        /// Image to inspect
        image: PathBuf,
    },

    /// Check export and share capabilities
    Check {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    decal_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Fit { image, container } => commands::fit::run(&config, image, container).await,
        Commands::Compose {
            base,
            overlay,
            sticker,
            x,
            y,
            transform,
            container,
            share,
            out,
            native,
            filter,
        } => {
            commands::compose::run(
                config,
                commands::compose::ComposeArgs {
                    base,
                    overlay,
                    sticker,
                    x,
                    y,
                    transform,
                    container,
                    share,
                    out,
                    native,
                    filter,
                },
            )
            .await
        }
        Commands::Gallery { add } => commands::gallery::run(&config, add).await,
        Commands::Info { image } => commands::info::run(&config, image).await,
        Commands::Check { write_config } => commands::check::run(&config, write_config),
    }
}
