// SPDX-License-Identifier: GPL-3.0-only

use camera_recorder::constants::app_info;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "camera-recorder")]
#[command(about = "Record audio and video from capture devices")]
#[command(version = app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List capture modes of the available video sources
    Modes {
        /// JSON device profile to use instead of the system's video sources
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Show which capture mode a request negotiates to
    Negotiate {
        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        #[arg(long, default_value = "30")]
        fps: u32,

        /// standard, wide-gamut, hdr or log
        #[arg(long, default_value = "standard")]
        color_space: camera_recorder::ColorSpace,

        /// JSON device profile to use instead of the system's video sources
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Record test sources through the recording engine
    Record(RecordArgs),
}

#[derive(Args)]
pub struct RecordArgs {
    /// Output file path (default: ~/Videos/Camera/recording_TIMESTAMP.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Recording duration in seconds
    #[arg(short, long, default_value = "5")]
    pub duration: u64,

    /// lowest, sd, hd, fhd, uhd or highest
    #[arg(short, long)]
    pub quality: Option<camera_recorder::QualityTier>,

    #[arg(long)]
    pub codec: Option<camera_recorder::RecordingCodec>,

    #[arg(long)]
    pub container: Option<camera_recorder::ContainerType>,

    #[arg(long)]
    pub color_space: Option<camera_recorder::ColorSpace>,

    /// Fixed capture frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Record video only
    #[arg(long)]
    pub no_audio: bool,

    /// JSON device profile to negotiate against (default: test pattern device)
    #[arg(short, long)]
    pub profile: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_recorder=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Modes { profile } => cli::list_modes(profile),
        Commands::Negotiate {
            width,
            height,
            fps,
            color_space,
            profile,
        } => cli::negotiate_mode(width, height, fps, color_space, profile),
        Commands::Record(args) => cli::record(args),
    }
}
