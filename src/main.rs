// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barcode-scan")]
#[command(about = "Single-shot barcode scanner")]
#[command(version = barcode_scan::constants::app_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan images replayed as a live camera feed
    Scan {
        /// Launch options as JSON (object or argument array)
        #[arg(short, long, default_value = "{}")]
        options: String,

        /// Frames per second produced by the virtual camera
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Give up after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Images to replay, in order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Print the region of interest for a viewport
    Geometry {
        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        /// Fraction of the shorter side covered by the region
        #[arg(short, long)]
        detector_size: Option<f64>,
    },

    /// Render the scan guide to an image file
    Overlay {
        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        /// Fraction of the shorter side covered by the region
        #[arg(short, long)]
        detector_size: Option<f64>,

        /// Stroke color as #RRGGBB or #RRGGBBAA
        #[arg(short, long)]
        color: Option<String>,

        /// Output file path
        #[arg(short = 'O', long)]
        output: PathBuf,
    },

    /// List barcode formats and their bits
    Formats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barcode_scan=trace
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
        Commands::Scan {
            options,
            fps,
            timeout,
            images,
        } => cli::scan(&options, &images, fps, timeout),
        Commands::Geometry {
            width,
            height,
            detector_size,
        } => cli::geometry(width, height, detector_size),
        Commands::Overlay {
            width,
            height,
            detector_size,
            color,
            output,
        } => cli::render_overlay(width, height, detector_size, color.as_deref(), &output),
        Commands::Formats => cli::list_formats(),
    }
}
