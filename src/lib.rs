// SPDX-License-Identifier: MPL-2.0

//! Barcode Scan - single-shot camera barcode scanning core
//!
//! Watches a live camera feed, searches a centered region of interest for a
//! barcode and ends the scan on the first successful decode.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Scan controller, frame processing, gestures and overlay
//! - [`backends`]: Camera, decoder and feedback abstractions with reference
//!   implementations
//! - [`config`]: Launch options and validated scan configuration
//! - [`errors`]: Error types
//!
//! # Example
//!
//! ```ignore
//! let config = ScanConfig::from_options(&LaunchOptions::from_json(options)?);
//! let decoder = Arc::new(QrDecoder::new(config.format_mask));
//! let mut controller = ScanController::new(config, decoder, Handle::current());
//! controller.start(&provider, PermissionStatus::Granted);
//! let outcome = controller.finish().await;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types
pub use app::frame_processor::{BarcodeFormat, FormatMask, RawDetection, SessionState, ValueType};
pub use app::{PermissionStatus, ScanController, ScanOutcome, ScanResult};
pub use config::{LaunchOptions, ScanConfig};
pub use errors::{AppError, AppResult, SetupError};
