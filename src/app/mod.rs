// SPDX-License-Identifier: MPL-2.0

//! Scanner application core
//!
//! # Architecture
//!
//! - `controller`: Scan lifecycle (permission, binding, teardown)
//! - `frame_processor`: Frame gate, geometry, detection session and worker
//! - `handlers`: Gesture handling for zoom and torch
//! - `scan_overlay`: Guide drawn over the region of interest
//! - `payload`: Result payloads handed back to the host
//!
//! # Main Types
//!
//! - `ScanController`: Runs one scan from launch to result
//! - `ScanOutcome`: Terminal result of a scan

pub mod controller;
pub mod frame_processor;
pub mod handlers;
pub mod payload;
pub mod scan_overlay;

pub use controller::{PermissionStatus, ScanController};
pub use payload::{ScanOutcome, ScanResult};
