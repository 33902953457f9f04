// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the scanner
//!
//! This module provides command-line functionality for:
//! - Scanning still images through a virtual camera
//! - Printing the region of interest for a viewport
//! - Rendering the scan guide to an image

use barcode_scan::app::frame_processor::geometry::{GuideShape, compute_rects};
use barcode_scan::app::frame_processor::types::BarcodeFormat;
use barcode_scan::app::scan_overlay::{OverlayRenderer, RgbaSurface};
use barcode_scan::app::{PermissionStatus, ScanController, ScanOutcome};
use barcode_scan::backends::camera::virtual_camera::VirtualCameraProvider;
use barcode_scan::backends::decoder::QrDecoder;
use barcode_scan::config::{LaunchOptions, ScanConfig, sanitize_detector_size};
use barcode_scan::constants::{DEFAULT_DETECTOR_SIZE, guide};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Scan images replayed as a camera feed and print the host payload
pub fn scan(
    options: &str,
    images: &[PathBuf],
    fps: u32,
    timeout_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = LaunchOptions::from_json(options)?;
    let config = ScanConfig::from_options(&options);

    if !config.format_mask.contains(BarcodeFormat::QrCode) {
        eprintln!("Warning: QR_CODE is not in the format mask, nothing will be decoded");
    }

    let provider = VirtualCameraProvider::from_paths(images)?.with_fps(fps);
    println!("Scanning {} image(s) at {} fps", images.len(), fps);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        let decoder = Arc::new(QrDecoder::new(config.format_mask));
        let mut controller = ScanController::new(config, decoder, Handle::current());
        controller.start(&provider, PermissionStatus::Granted);

        match timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), controller.finish())
                .await
                .ok()
                .flatten(),
            None => controller.finish().await,
        }
    });

    let outcome = outcome.ok_or("No barcode found before the timeout")?;
    println!("{}", outcome.to_host_args());

    let stats = provider.stats();
    println!(
        "Frames produced: {}, released: {}",
        stats.produced(),
        stats.released()
    );

    match outcome {
        ScanOutcome::Completed(_) => Ok(()),
        ScanOutcome::Aborted(error) => Err(error.into()),
    }
}

/// Print the region of interest for a viewport
pub fn geometry(
    width: u32,
    height: u32,
    detector_size: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ratio = sanitize_detector_size(detector_size.unwrap_or(DEFAULT_DETECTOR_SIZE));
    let (crop, _) = compute_rects(width, height, ratio);

    println!("Viewport: {}x{}", width, height);
    println!("ROI ratio: {}", ratio);
    println!(
        "Region: ({}, {}) - ({}, {}), side {}",
        crop.left,
        crop.top,
        crop.right,
        crop.bottom,
        crop.width()
    );
    match GuideShape::for_ratio(ratio) {
        GuideShape::Rectangle => println!("Guide: rectangle"),
        GuideShape::RoundedRectangle { radius } => {
            println!("Guide: rounded rectangle (radius {})", radius)
        }
    }

    Ok(())
}

/// Render the scan guide onto a transparent image
pub fn render_overlay(
    width: u32,
    height: u32,
    detector_size: Option<f64>,
    color: Option<&str>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if width == 0 || height == 0 {
        return Err("Overlay dimensions must be non-zero".into());
    }

    let color = match color {
        Some(hex) => parse_color(hex).ok_or_else(|| format!("Invalid color '{}'", hex))?,
        None => guide::DEFAULT_COLOR,
    };
    let ratio = sanitize_detector_size(detector_size.unwrap_or(DEFAULT_DETECTOR_SIZE));

    let mut renderer =
        OverlayRenderer::new(RgbaSurface::new(width, height), ratio).with_color(color);
    renderer.redraw();
    renderer.surface().save(output)?;

    println!("Guide saved: {}", output.display());
    Ok(())
}

/// List the barcode formats and their bits
pub fn list_formats() -> Result<(), Box<dyn std::error::Error>> {
    println!("Barcode formats:");
    for format in BarcodeFormat::ALL {
        println!("  {:>5}  {}", format.bit(), format);
    }
    Ok(())
}

/// Parse `#RRGGBB` or `#RRGGBBAA`
fn parse_color(hex: &str) -> Option<[u8; 4]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 0xFF };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}
