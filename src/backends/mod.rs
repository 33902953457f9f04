// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer
//!
//! Everything the scanner needs from the platform sits behind a trait here:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │   Camera    │    │     Decoder      │   │
//! │  │  (virtual)  │    │     (rqrr)       │   │
//! │  └─────────────┘    └──────────────────┘   │
//! │                     ┌──────────────────┐   │
//! │                     │     Feedback     │   │
//! │                     └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Camera binding, frame types and the virtual camera
//! - [`decoder`]: Asynchronous barcode decoding
//! - [`feedback`]: Beep/vibrate after a successful scan

pub mod camera;
pub mod decoder;
pub mod feedback;
