// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! Region extraction and the worker that drives a detection session.

pub mod crop;
pub mod worker;

pub use crop::crop_frame;
pub use worker::ScanPipeline;
