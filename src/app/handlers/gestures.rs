// SPDX-License-Identifier: GPL-3.0-only

//! Gesture handlers
//!
//! Maps pinch and tap gestures to zoom and torch commands on the bound
//! camera. Gestures work independently of the scan session; without a bound
//! camera they do nothing.

use crate::backends::camera::{CameraControl, CameraInfo};
use std::sync::Arc;
use tracing::{debug, info};

/// Touch gestures forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A pinch finished with the given scale factor
    PinchEnd { scale: f32 },
    /// The torch button was tapped
    TorchTap,
}

/// Command issued in response to a gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    Zoom(f32),
    Torch(TorchIcon),
}

/// Icon shown on the torch button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchIcon {
    Active,
    Inactive,
}

impl TorchIcon {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            TorchIcon::Active
        } else {
            TorchIcon::Inactive
        }
    }

    /// Drawable name used by the host
    pub fn name(self) -> &'static str {
        match self {
            TorchIcon::Active => "torch_active",
            TorchIcon::Inactive => "torch_inactive",
        }
    }
}

/// Gesture-to-camera mapping
///
/// Generic over the camera so both concrete cameras and `dyn CameraBinding`
/// handles can be driven.
pub struct GestureController<B: ?Sized> {
    camera: Option<Arc<B>>,
}

impl<B: CameraInfo + CameraControl + ?Sized> GestureController<B> {
    pub fn new(camera: Option<Arc<B>>) -> Self {
        Self { camera }
    }

    /// Controller for a camera that is not bound yet
    pub fn unbound() -> Self {
        Self { camera: None }
    }

    pub fn is_bound(&self) -> bool {
        self.camera.is_some()
    }

    pub fn handle(&self, gesture: Gesture) -> Option<GestureEffect> {
        match gesture {
            Gesture::PinchEnd { scale } => self.on_pinch_end(scale).map(GestureEffect::Zoom),
            Gesture::TorchTap => self
                .on_torch_tap()
                .map(|enabled| GestureEffect::Torch(TorchIcon::from_enabled(enabled))),
        }
    }

    /// Scale the current zoom ratio
    ///
    /// The camera clamps the ratio to what it supports. Returns the requested
    /// ratio.
    pub fn on_pinch_end(&self, scale: f32) -> Option<f32> {
        let camera = self.camera.as_ref()?;
        let current = camera.zoom_ratio();
        let requested = current * scale;

        debug!(current, scale, requested, "Pinch zoom");
        camera.set_zoom_ratio(requested);
        Some(requested)
    }

    /// Toggle the torch
    ///
    /// Returns the new torch state, or `None` when the camera has not
    /// reported its torch state yet.
    pub fn on_torch_tap(&self) -> Option<bool> {
        let camera = self.camera.as_ref()?;
        let Some(enabled) = camera.torch_enabled() else {
            debug!("Torch state unknown, ignoring tap");
            return None;
        };

        let enabled = !enabled;
        camera.enable_torch(enabled);
        info!(torch_enabled = enabled, "Torch toggled");
        Some(enabled)
    }
}

impl<B: ?Sized> Clone for GestureController<B> {
    fn clone(&self) -> Self {
        Self {
            camera: self.camera.clone(),
        }
    }
}
