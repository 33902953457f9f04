// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for single-shot barcode detection
//!
//! Frames flow from the camera through a keep-only-latest gate to a single
//! worker, which crops the region of interest and hands it to the decoder.
//! The detection session ends the scan on the first successful decode.

pub mod gate;
pub mod geometry;
pub mod session;
pub mod tasks;
pub mod types;

pub use gate::{AdmittedFrame, FrameGate, GateStats};
pub use geometry::{GuideShape, RoiRect, compute_rects, compute_roi};
pub use session::{DetectionSession, OutcomeReceiver, SessionState, SessionStats};
pub use tasks::ScanPipeline;
pub use types::{BarcodeFormat, FormatMask, RawDetection, ValueType};
