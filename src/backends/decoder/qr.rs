// SPDX-License-Identifier: GPL-3.0-only

//! QR code decoder
//!
//! Reference [`Decoder`] implementation built on the rqrr crate. The crop is
//! converted to grayscale, rotated upright and searched for QR grids on a
//! blocking thread so the async runtime is never stalled.

use super::{DecodeOutcome, Decoder};
use crate::app::frame_processor::types::{BarcodeFormat, FormatMask, RawDetection};
use crate::backends::camera::{CroppedFrame, PixelFormat, SensorRotation};
use crate::errors::DecodeError;
use futures::future::BoxFuture;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage, imageops};
use tracing::{debug, trace};

/// QR code decoder
///
/// Only searches for QR codes; other formats in the mask are ignored.
#[derive(Debug, Clone, Copy)]
pub struct QrDecoder {
    formats: FormatMask,
}

impl QrDecoder {
    /// Create a decoder restricted to `formats`
    pub fn new(formats: FormatMask) -> Self {
        Self { formats }
    }
}

impl Decoder for QrDecoder {
    fn process(&self, image: CroppedFrame) -> BoxFuture<'static, DecodeOutcome> {
        Box::pin(decode(image, self.formats))
    }
}

async fn decode(image: CroppedFrame, formats: FormatMask) -> DecodeOutcome {
    if !formats.contains(BarcodeFormat::QrCode) {
        trace!(mask = formats.bits(), "QR_CODE not requested, skipping frame");
        return Ok(Vec::new());
    }

    // Run detection in a blocking task to avoid blocking the async runtime
    tokio::task::spawn_blocking(move || detect_sync(&image)).await?
}

/// Synchronous QR detection (runs in blocking task)
fn detect_sync(image: &CroppedFrame) -> DecodeOutcome {
    let start = std::time::Instant::now();

    let gray = rotate_upright(to_luma(image)?, image.rotation);
    let (width, height) = gray.dimensions();

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();

    trace!(
        width,
        height,
        grids = grids.len(),
        detection_ms = start.elapsed().as_millis(),
        "QR grid search complete"
    );

    let mut detections = Vec::with_capacity(grids.len());
    for grid in grids {
        let mut payload = Vec::new();
        match grid.decode_to(&mut payload) {
            Ok(meta) => {
                debug!(meta = ?meta, bytes = payload.len(), "Decoded QR code");
                detections.push(RawDetection::from_bytes(payload, BarcodeFormat::QrCode));
            }
            Err(e) => {
                debug!(error = ?e, "Failed to decode QR grid");
            }
        }
    }

    Ok(detections)
}

/// Convert a cropped frame to 8-bit luma
fn to_luma(image: &CroppedFrame) -> Result<GrayImage, DecodeError> {
    let (w, h) = (image.width, image.height);
    let data = image.data.clone();

    let gray = match image.format {
        PixelFormat::Gray8 => GrayImage::from_raw(w, h, data),
        PixelFormat::RGBA => {
            RgbaImage::from_raw(w, h, data).map(|img| DynamicImage::ImageRgba8(img).to_luma8())
        }
        PixelFormat::RGB24 => {
            RgbImage::from_raw(w, h, data).map(|img| DynamicImage::ImageRgb8(img).to_luma8())
        }
    };

    gray.ok_or_else(|| {
        DecodeError::InvalidImage(format!(
            "{} bytes do not describe a {}x{} {:?} image",
            image.data.len(),
            w,
            h,
            image.format
        ))
    })
}

/// Rotate clockwise by the sensor rotation so the code is upright
fn rotate_upright(gray: GrayImage, rotation: SensorRotation) -> GrayImage {
    match rotation {
        SensorRotation::None => gray,
        SensorRotation::Rotate90 => imageops::rotate90(&gray),
        SensorRotation::Rotate180 => imageops::rotate180(&gray),
        SensorRotation::Rotate270 => imageops::rotate270(&gray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32, format: PixelFormat) -> CroppedFrame {
        CroppedFrame {
            width,
            height,
            format,
            data: vec![255u8; (width * height * format.bytes_per_pixel()) as usize],
            rotation: SensorRotation::None,
        }
    }

    #[tokio::test]
    async fn test_blank_image_has_no_detections() {
        let decoder = QrDecoder::new(FormatMask::from_formats(&[BarcodeFormat::QrCode]));
        let detections = decoder
            .process(blank(64, 64, PixelFormat::RGBA))
            .await
            .expect("decode blank image");
        assert!(detections.is_empty());
    }

    #[tokio::test]
    async fn test_qr_not_in_mask_is_skipped() {
        let decoder = QrDecoder::new(FormatMask::DEFAULT);
        // Malformed buffer would fail conversion if it were looked at
        let mut image = blank(64, 64, PixelFormat::RGBA);
        image.data.truncate(10);
        assert_eq!(decoder.process(image).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_malformed_buffer_is_an_error() {
        let decoder = QrDecoder::new(FormatMask::from_formats(&[BarcodeFormat::QrCode]));
        let mut image = blank(8, 8, PixelFormat::RGB24);
        image.data.truncate(10);
        let result = decoder.process(image).await;
        assert!(matches!(result, Err(DecodeError::InvalidImage(_))));
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let gray = GrayImage::new(4, 2);
        let rotated = rotate_upright(gray.clone(), SensorRotation::Rotate90);
        assert_eq!(rotated.dimensions(), (2, 4));
        let flipped = rotate_upright(gray, SensorRotation::Rotate180);
        assert_eq!(flipped.dimensions(), (4, 2));
    }
}
