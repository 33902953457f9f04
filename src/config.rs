// SPDX-License-Identifier: GPL-3.0-only

//! Launch options and validated scan configuration

use crate::app::frame_processor::types::FormatMask;
use crate::constants::DEFAULT_DETECTOR_SIZE;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Options supplied by the host when it starts a scan
///
/// Every key is optional. Values are taken as given; validation happens in
/// [`ScanConfig::from_options`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchOptions {
    /// Bitmask of barcode formats, `0` means "use the default formats"
    pub barcode_formats: u32,
    /// Fraction of the viewport covered by the detection region
    pub detector_size: Option<f64>,
    /// Mirror the preview horizontally and vertically
    pub rotate_camera: bool,
    pub beep_on_success: bool,
    pub vibrate_on_success: bool,
}

impl LaunchOptions {
    /// Parse options from JSON
    ///
    /// Accepts either the options object itself or the host's argument
    /// array, whose first element is the options object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let options = match value {
            Value::Array(mut args) => {
                if args.is_empty() {
                    return Err(ConfigError::MissingOptions);
                }
                args.swap_remove(0)
            }
            other => other,
        };

        if !options.is_object() {
            return Err(ConfigError::MissingOptions);
        }

        Ok(serde_json::from_value(options)?)
    }
}

/// Immutable configuration for one scan session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Formats the decoder looks for, never empty
    pub format_mask: FormatMask,
    /// ROI ratio, always inside the open interval (0, 1)
    pub roi_ratio: f64,
    /// Mirror the preview on both axes (display only)
    pub mirror_preview: bool,
    pub beep_on_success: bool,
    pub vibrate_on_success: bool,
}

impl ScanConfig {
    /// Validate launch options
    ///
    /// Out-of-range values are replaced by their defaults; this never fails.
    pub fn from_options(options: &LaunchOptions) -> Self {
        let format_mask = if options.barcode_formats == 0 {
            FormatMask::DEFAULT
        } else {
            FormatMask::from_bits(options.barcode_formats)
        };

        let requested_ratio = options.detector_size.unwrap_or(DEFAULT_DETECTOR_SIZE);

        Self {
            format_mask,
            roi_ratio: sanitize_detector_size(requested_ratio),
            mirror_preview: options.rotate_camera,
            beep_on_success: options.beep_on_success,
            vibrate_on_success: options.vibrate_on_success,
        }
    }

    /// Preview transform for the host's preview view
    pub fn preview_transform(&self) -> PreviewTransform {
        if self.mirror_preview {
            PreviewTransform {
                scale_x: -1.0,
                scale_y: -1.0,
            }
        } else {
            PreviewTransform::default()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_options(&LaunchOptions::default())
    }
}

/// Clamp a detector size into (0, 1), substituting the default otherwise
pub fn sanitize_detector_size(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 && size < 1.0 {
        size
    } else {
        debug!(
            requested = size,
            applied = DEFAULT_DETECTOR_SIZE,
            "Detector size out of range, using default"
        );
        DEFAULT_DETECTOR_SIZE
    }
}

/// Scale applied to the preview view
///
/// Only affects what the user sees; crops and decoding use the unmirrored
/// frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for PreviewTransform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_detector_size() {
        assert_eq!(sanitize_detector_size(0.3), 0.3);
        assert_eq!(sanitize_detector_size(0.0), 0.5);
        assert_eq!(sanitize_detector_size(1.0), 0.5);
        assert_eq!(sanitize_detector_size(-2.0), 0.5);
        assert_eq!(sanitize_detector_size(f64::NAN), 0.5);
    }

    #[test]
    fn test_array_arguments() {
        let options = LaunchOptions::from_json(r#"[{"detectorSize": 0.7}, "ignored"]"#)
            .expect("parse argument array");
        assert_eq!(options.detector_size, Some(0.7));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        assert_eq!(
            LaunchOptions::from_json("[]"),
            Err(ConfigError::MissingOptions)
        );
        assert_eq!(
            LaunchOptions::from_json("42"),
            Err(ConfigError::MissingOptions)
        );
    }

    #[test]
    fn test_mirror_transform() {
        let config = ScanConfig::from_options(&LaunchOptions {
            rotate_camera: true,
            ..LaunchOptions::default()
        });
        assert_eq!(config.preview_transform().scale_x, -1.0);
        assert_eq!(config.preview_transform().scale_y, -1.0);
        assert_eq!(ScanConfig::default().preview_transform(), PreviewTransform::default());
    }
}
