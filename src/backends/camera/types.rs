// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use std::sync::Arc;
use std::time::Instant;

/// Frame pixel storage
///
/// Producers that replay the same buffer (virtual cameras, tests) hand out
/// `Shared` data; live producers usually hand over an `Owned` buffer.
#[derive(Clone)]
pub enum FrameData {
    /// Reference-counted buffer shared with the producer
    Shared(Arc<[u8]>),
    /// Buffer owned by this frame
    Owned(Vec<u8>),
}

impl FrameData {
    /// Get the length of the frame data in bytes
    pub fn len(&self) -> usize {
        match self {
            FrameData::Shared(data) => data.len(),
            FrameData::Owned(data) => data.len(),
        }
    }

    /// Check if the frame data is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Shared(data) => write!(f, "FrameData::Shared({} bytes)", data.len()),
            FrameData::Owned(data) => write!(f, "FrameData::Owned({} bytes)", data.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Shared(data) => data.as_ref(),
            FrameData::Owned(data) => data.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

impl From<Vec<u8>> for FrameData {
    fn from(data: Vec<u8>) -> Self {
        FrameData::Owned(data)
    }
}

impl From<Arc<[u8]>> for FrameData {
    fn from(data: Arc<[u8]>) -> Self {
        FrameData::Shared(data)
    }
}

/// Pixel format of frame data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel), e.g. the Y plane of a YUV frame
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Sensor rotation in degrees (clockwise)
///
/// Reported with every frame so the decoder can look at the image upright.
/// Rotation never changes crop geometry: the crop is taken in sensor
/// coordinates and rotated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Which physical camera to bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LensFacing {
    #[default]
    Back,
    Front,
    External,
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub name: String,
    /// Backend-specific identifier
    pub path: String,
    pub facing: LensFacing,
}

/// Parameters for binding a camera to the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRequest {
    pub facing: LensFacing,
}

impl Default for BindRequest {
    fn default() -> Self {
        Self {
            facing: LensFacing::Back,
        }
    }
}

/// Called when a frame is dropped, returning its buffer to the producer
pub type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

/// A single frame from the camera
///
/// A frame has exactly one owner at a time. It is deliberately not `Clone`:
/// ownership moves from the producer to the frame gate, then to the detection
/// worker, and finally to the decode completion. Dropping the frame runs its
/// release hook.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: FrameData,
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    pub rotation: SensorRotation,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
    release: Option<ReleaseHook>,
}

impl Frame {
    /// Create a tightly packed frame (stride = width * bytes per pixel)
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<FrameData>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format,
            stride: width.saturating_mul(format.bytes_per_pixel()),
            rotation: SensorRotation::None,
            captured_at: Instant::now(),
            release: None,
        }
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_rotation(mut self, rotation: SensorRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Attach a hook that runs when the frame is released
    pub fn with_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    /// Check that the buffer actually holds the declared geometry
    pub fn is_valid(&self) -> bool {
        if self.width == 0 || self.height == 0 || self.data.is_empty() {
            return false;
        }
        let Some(row_bytes) =
            (self.width as usize).checked_mul(self.format.bytes_per_pixel() as usize)
        else {
            return false;
        };
        let stride = self.stride as usize;
        if stride < row_bytes {
            return false;
        }
        stride
            .checked_mul(self.height as usize - 1)
            .and_then(|rows| rows.checked_add(row_bytes))
            .is_some_and(|required| self.data.len() >= required)
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("stride", &self.stride)
            .field("rotation", &self.rotation)
            .field("data", &self.data)
            .finish()
    }
}

/// A tightly packed region copied out of a [`Frame`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Pixel data without stride padding
    pub data: Vec<u8>,
    /// Rotation of the source frame
    pub rotation: SensorRotation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(SensorRotation::from_degrees(90), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees(-90), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees(540), SensorRotation::Rotate180);
        assert_eq!(SensorRotation::from_degrees(45), SensorRotation::None);
        assert!(SensorRotation::Rotate270.swaps_dimensions());
    }

    #[test]
    fn test_frame_validity() {
        let frame = Frame::new(2, 2, PixelFormat::RGBA, vec![0u8; 16]);
        assert!(frame.is_valid());

        let short = Frame::new(2, 2, PixelFormat::RGBA, vec![0u8; 12]);
        assert!(!short.is_valid());

        let empty = Frame::new(2, 2, PixelFormat::Gray8, Vec::new());
        assert!(!empty.is_valid());

        // Last row needs no trailing padding
        let padded = Frame::new(2, 2, PixelFormat::Gray8, vec![0u8; 5]).with_stride(3);
        assert!(padded.is_valid());
    }

    #[test]
    fn test_oversized_declared_width_is_invalid() {
        let frame = Frame::new(u32::MAX / 2, 2, PixelFormat::RGBA, vec![0u8; 16]);
        assert_eq!(frame.stride, u32::MAX);
        assert!(!frame.is_valid());
    }

    #[test]
    fn test_release_hook_runs_on_drop() {
        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);

        let frame = Frame::new(1, 1, PixelFormat::Gray8, vec![0u8])
            .with_release(move || flag.store(true, Ordering::SeqCst));
        assert!(!released.load(Ordering::SeqCst));

        drop(frame);
        assert!(released.load(Ordering::SeqCst));
    }
}
