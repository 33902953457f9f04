// SPDX-License-Identifier: GPL-3.0-only

//! Input handler modules
//!
//! Handlers for host input that acts on the camera rather than on the scan.

pub mod gestures;

pub use gestures::{Gesture, GestureController, GestureEffect, TorchIcon};
