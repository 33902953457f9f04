// SPDX-License-Identifier: GPL-3.0-only

//! Region extraction
//!
//! Copies the region of interest out of a camera frame into a tightly packed
//! buffer the decoder can own.

use crate::app::frame_processor::geometry::RoiRect;
use crate::backends::camera::{CroppedFrame, Frame};
use tracing::trace;

/// Copy `rect` out of `frame`, dropping stride padding
///
/// The rectangle is clamped to the frame first. Returns `None` when nothing
/// is left or the buffer is shorter than the frame claims.
pub fn crop_frame(frame: &Frame, rect: RoiRect) -> Option<CroppedFrame> {
    let rect = rect.clamp_to(frame.width, frame.height);
    if rect.is_empty() {
        return None;
    }

    let bpp = frame.format.bytes_per_pixel() as usize;
    let stride = frame.stride as usize;
    let row_bytes = rect.width() as usize * bpp;

    let mut data = Vec::with_capacity(row_bytes * rect.height() as usize);
    for y in rect.top..rect.bottom {
        let row_start = y as usize * stride + rect.left as usize * bpp;
        let row = frame.data.get(row_start..row_start + row_bytes)?;
        data.extend_from_slice(row);
    }

    trace!(
        left = rect.left,
        top = rect.top,
        width = rect.width(),
        height = rect.height(),
        "Cropped region of interest"
    );

    Some(CroppedFrame {
        width: rect.width(),
        height: rect.height(),
        format: frame.format,
        data,
        rotation: frame.rotation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{PixelFormat, SensorRotation};

    #[test]
    fn test_crop_skips_stride_padding() {
        // 3x2 RGBA frame with two bytes of padding per row
        let data: Vec<u8> = vec![
            1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 0, 0, // row 0 + padding
            4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 0, 0, // row 1 + padding
        ];
        let frame = Frame::new(3, 2, PixelFormat::RGBA, data)
            .with_stride(14)
            .with_rotation(SensorRotation::Rotate90);

        let rect = RoiRect {
            left: 1,
            top: 0,
            right: 3,
            bottom: 2,
        };
        let crop = crop_frame(&frame, rect).expect("crop inside frame");

        assert_eq!((crop.width, crop.height), (2, 2));
        assert_eq!(crop.rotation, SensorRotation::Rotate90);
        assert_eq!(
            crop.data,
            vec![2, 2, 2, 2, 3, 3, 3, 3, 5, 5, 5, 5, 6, 6, 6, 6]
        );
    }

    #[test]
    fn test_crop_is_clamped_to_frame() {
        let frame = Frame::new(4, 4, PixelFormat::Gray8, (0u8..16).collect::<Vec<_>>());
        let rect = RoiRect {
            left: 2,
            top: 2,
            right: 10,
            bottom: 10,
        };
        let crop = crop_frame(&frame, rect).expect("partially overlapping crop");
        assert_eq!((crop.width, crop.height), (2, 2));
        assert_eq!(crop.data, vec![10, 11, 14, 15]);
    }

    #[test]
    fn test_crop_outside_frame() {
        let frame = Frame::new(4, 4, PixelFormat::Gray8, vec![0u8; 16]);
        let rect = RoiRect {
            left: 8,
            top: 8,
            right: 12,
            bottom: 12,
        };
        assert!(crop_frame(&frame, rect).is_none());
    }
}
