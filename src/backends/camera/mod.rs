// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The scanner never talks to camera hardware directly. Platform bindings
//! implement the traits in this module and the scan controller drives them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   ScanController    │
//! └──────────┬──────────┘
//!            │ bind(request, sink)
//!            ▼
//! ┌─────────────────────┐        frames        ┌──────────────┐
//! │   CameraProvider    │ ───────────────────▶ │  FrameSink   │
//! └──────────┬──────────┘                      └──────────────┘
//!            │ returns
//!            ▼
//! ┌─────────────────────┐
//! │    CameraBinding    │  ← CameraInfo + CameraControl (zoom, torch)
//! └─────────────────────┘
//! ```

pub mod frame_loop;
pub mod types;
pub mod virtual_camera;

pub use types::*;

use crate::errors::SetupError;
use std::sync::Arc;

/// Receives frames from a bound camera
///
/// Called on the producer's context. Implementations must decide quickly and
/// never block: the camera keeps producing regardless of what the sink does.
pub trait FrameSink: Send + Sync {
    fn on_frame(&self, frame: Frame);
}

/// Read access to the bound camera's current parameters
pub trait CameraInfo: Send + Sync {
    /// Current zoom ratio as reported by the device
    fn zoom_ratio(&self) -> f32;

    /// Current torch state, `None` while the device has not reported one
    fn torch_enabled(&self) -> Option<bool>;
}

/// Write access to the bound camera's parameters
///
/// Implementations clamp values to what the device supports.
pub trait CameraControl: Send + Sync {
    fn set_zoom_ratio(&self, ratio: f32);

    fn enable_torch(&self, enabled: bool);
}

/// A camera bound to the analysis pipeline
pub trait CameraBinding: CameraInfo + CameraControl {
    /// Stop frame delivery and release the device
    ///
    /// Must be idempotent.
    fn unbind(&self);
}

/// Source of camera bindings
pub trait CameraProvider: Send + Sync {
    /// Enumerate available cameras
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Bind a camera and start delivering frames to `sink`
    fn bind(
        &self,
        request: BindRequest,
        sink: Arc<dyn FrameSink>,
    ) -> Result<Arc<dyn CameraBinding>, SetupError>;
}
