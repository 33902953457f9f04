// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// ROI ratio used when the launch options omit `detectorSize` or supply
/// a value outside the open interval (0, 1)
pub const DEFAULT_DETECTOR_SIZE: f64 = 0.5;

/// Guide overlay constants
pub mod guide {
    /// At or below this detector size the guide is too small for rounded corners
    pub const ROUNDED_CUTOFF: f64 = 0.3;

    /// Corner radius of the rounded guide (pixels)
    pub const CORNER_RADIUS: f32 = 100.0;

    /// Stroke width of the guide border (pixels)
    pub const STROKE_WIDTH: f32 = 5.0;

    /// Default guide color, opaque white (`#FFFFFF`)
    pub const DEFAULT_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
}

/// Success feedback constants
pub mod feedback {
    use super::Duration;

    /// Duration of the one-shot vibration played after a successful scan
    pub const VIBRATION_DURATION: Duration = Duration::from_millis(200);
}

/// Supported file formats for the virtual camera
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Virtual camera timing constants
pub mod virtual_camera {
    use super::Duration;

    /// Default replay rate for still images
    pub const DEFAULT_FPS: u32 = 30;

    /// Zoom ratio reported before any pinch gesture
    pub const INITIAL_ZOOM_RATIO: f32 = 1.0;

    /// Convert a frame rate into the producer's sleep interval
    pub fn frame_interval(fps: u32) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(fps.max(1)))
    }
}

/// Application version string, embedded by the build script
pub fn app_version() -> &'static str {
    env!("GIT_VERSION")
}
