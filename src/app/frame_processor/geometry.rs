// SPDX-License-Identifier: GPL-3.0-only

//! Region of interest geometry
//!
//! The same computation positions the crop inside each camera frame and the
//! guide drawn over the viewport, so what the user sees is exactly what the
//! decoder searches.

use crate::config::sanitize_detector_size;
use crate::constants::guide;

/// Centered square region in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoiRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl RoiRect {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersect with a `width` x `height` area
    pub fn clamp_to(&self, width: u32, height: u32) -> RoiRect {
        RoiRect {
            left: self.left.min(width),
            top: self.top.min(height),
            right: self.right.min(width),
            bottom: self.bottom.min(height),
        }
    }
}

/// Shape of the guide drawn around the region
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideShape {
    Rectangle,
    RoundedRectangle { radius: f32 },
}

impl GuideShape {
    /// Small regions get square corners, larger ones rounded corners
    ///
    /// An out-of-range ratio is treated as the default detector size.
    pub fn for_ratio(roi_ratio: f64) -> Self {
        if sanitize_detector_size(roi_ratio) <= guide::ROUNDED_CUTOFF {
            GuideShape::Rectangle
        } else {
            GuideShape::RoundedRectangle {
                radius: guide::CORNER_RADIUS,
            }
        }
    }
}

/// Compute the centered region for a `width` x `height` area
///
/// The side length is `roi_ratio * min(width, height)`, with the margin
/// truncated rather than the side. Halves use integer division, so an odd side
/// loses one pixel. A ratio outside `(0, 1)` falls back to the default
/// detector size.
pub fn compute_roi(width: u32, height: u32, roi_ratio: f64) -> RoiRect {
    let roi_ratio = sanitize_detector_size(roi_ratio);
    let diameter = width.min(height);
    let offset = ((1.0 - roi_ratio) * diameter as f64).trunc().clamp(0.0, diameter as f64) as u32;
    let half_side = (diameter - offset) / 2;

    RoiRect {
        left: width / 2 - half_side,
        top: height / 2 - half_side,
        right: width / 2 + half_side,
        bottom: height / 2 + half_side,
    }
}

/// Crop rectangle for a frame and overlay rectangle for a viewport
///
/// Both use [`compute_roi`]; when the frame and viewport share dimensions
/// the two rectangles are identical.
pub fn compute_rects(
    viewport_width: u32,
    viewport_height: u32,
    roi_ratio: f64,
) -> (RoiRect, RoiRect) {
    let crop = compute_roi(viewport_width, viewport_height, roi_ratio);
    (crop, crop)
}
