// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backed by still images
//!
//! Replays a list of images as a live frame stream on a producer thread.
//! Zoom and torch are kept in memory so gestures behave as they would on a
//! real device. Used by the command line tool and by tests.

use super::frame_loop::{FrameLoopController, LoopAction};
use super::{
    BindRequest, CameraBinding, CameraControl, CameraDevice, CameraInfo, CameraProvider, Frame,
    FrameData, FrameSink, LensFacing, PixelFormat, SensorRotation,
};
use crate::constants::{file_formats, virtual_camera as vc};
use crate::errors::{AppError, AppResult, SetupError};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Zoom range supported by the virtual device
const ZOOM_RANGE: (f32, f32) = (1.0, 8.0);

/// A decoded still image replayed as frames
#[derive(Debug, Clone)]
pub struct StillImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
}

impl StillImage {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data: Arc::from(data.into_boxed_slice()),
        }
    }
}

/// Load an image file as an RGBA still
pub fn load_image(path: &Path) -> AppResult<StillImage> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(AppError::Other(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        AppError::Storage(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    debug!(width, height, "Image loaded successfully");

    Ok(StillImage::new(width, height, PixelFormat::RGBA, rgba.into_raw()))
}

/// Frame accounting shared between the provider and its producer thread
#[derive(Debug, Default)]
pub struct ProducerStats {
    produced: AtomicU64,
    released: AtomicU64,
}

impl ProducerStats {
    /// Frames handed to the sink
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::SeqCst)
    }

    /// Frames whose buffers came back to the producer
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Frames currently held somewhere downstream
    pub fn outstanding(&self) -> u64 {
        self.produced().saturating_sub(self.released())
    }
}

#[derive(Debug, Clone)]
enum Availability {
    Available,
    NoCameras,
    Refuses(String),
}

/// Camera provider replaying still images
pub struct VirtualCameraProvider {
    images: Vec<StillImage>,
    interval: Duration,
    rotation: SensorRotation,
    availability: Availability,
    stats: Arc<ProducerStats>,
}

impl VirtualCameraProvider {
    pub fn new(images: Vec<StillImage>) -> Self {
        Self {
            images,
            interval: vc::frame_interval(vc::DEFAULT_FPS),
            rotation: SensorRotation::None,
            availability: Availability::Available,
            stats: Arc::new(ProducerStats::default()),
        }
    }

    /// Load every path as a still image
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> AppResult<Self> {
        let images = paths
            .iter()
            .map(|p| load_image(p.as_ref()))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self::new(images))
    }

    /// A provider on a device without any camera
    pub fn without_cameras() -> Self {
        Self {
            availability: Availability::NoCameras,
            ..Self::new(Vec::new())
        }
    }

    /// A provider that lists a camera but refuses to bind it
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            availability: Availability::Refuses(reason.into()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.interval = vc::frame_interval(fps);
        self
    }

    /// Produce frames back to back
    pub fn unpaced(mut self) -> Self {
        self.interval = Duration::ZERO;
        self
    }

    pub fn with_rotation(mut self, rotation: SensorRotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn stats(&self) -> Arc<ProducerStats> {
        Arc::clone(&self.stats)
    }
}

impl CameraProvider for VirtualCameraProvider {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        match self.availability {
            Availability::NoCameras => Vec::new(),
            _ => vec![CameraDevice {
                name: "Virtual Camera".to_string(),
                path: "virtual:0".to_string(),
                facing: LensFacing::Back,
            }],
        }
    }

    fn bind(
        &self,
        request: BindRequest,
        sink: Arc<dyn FrameSink>,
    ) -> Result<Arc<dyn CameraBinding>, SetupError> {
        match &self.availability {
            Availability::NoCameras => return Err(SetupError::NoCameraFound),
            Availability::Refuses(reason) => {
                return Err(SetupError::CameraUnavailable(reason.clone()));
            }
            Availability::Available => {}
        }

        if self.images.is_empty() {
            return Err(SetupError::CameraUnavailable(
                "virtual camera has no images".to_string(),
            ));
        }

        info!(
            facing = ?request.facing,
            images = self.images.len(),
            rotation = %self.rotation,
            "Binding virtual camera"
        );

        let images = self.images.clone();
        let rotation = self.rotation;
        let stats = Arc::clone(&self.stats);
        let mut index = 0usize;

        let controller = FrameLoopController::start("virtual-camera", self.interval, move || {
            let still = &images[index % images.len()];
            index = index.wrapping_add(1);

            let release_stats = Arc::clone(&stats);
            let frame = Frame::new(
                still.width,
                still.height,
                still.format,
                FrameData::Shared(Arc::clone(&still.data)),
            )
            .with_rotation(rotation)
            .with_release(move || {
                release_stats.released.fetch_add(1, Ordering::SeqCst);
            });

            stats.produced.fetch_add(1, Ordering::SeqCst);
            sink.on_frame(frame);
            LoopAction::Continue
        });

        Ok(Arc::new(VirtualCamera {
            zoom_bits: AtomicU32::new(vc::INITIAL_ZOOM_RATIO.to_bits()),
            torch: AtomicBool::new(false),
            controller: Mutex::new(Some(controller)),
        }))
    }
}

/// A bound virtual camera
pub struct VirtualCamera {
    zoom_bits: AtomicU32,
    torch: AtomicBool,
    controller: Mutex<Option<FrameLoopController>>,
}

impl CameraInfo for VirtualCamera {
    fn zoom_ratio(&self) -> f32 {
        f32::from_bits(self.zoom_bits.load(Ordering::SeqCst))
    }

    fn torch_enabled(&self) -> Option<bool> {
        Some(self.torch.load(Ordering::SeqCst))
    }
}

impl CameraControl for VirtualCamera {
    fn set_zoom_ratio(&self, ratio: f32) {
        let clamped = if ratio.is_finite() {
            ratio.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1)
        } else {
            ZOOM_RANGE.0
        };
        debug!(requested = ratio, applied = clamped, "Virtual camera zoom");
        self.zoom_bits.store(clamped.to_bits(), Ordering::SeqCst);
    }

    fn enable_torch(&self, enabled: bool) {
        debug!(enabled, "Virtual camera torch");
        self.torch.store(enabled, Ordering::SeqCst);
    }
}

impl CameraBinding for VirtualCamera {
    fn unbind(&self) {
        let controller = match self.controller.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(mut controller) = controller {
            info!("Unbinding virtual camera");
            controller.stop();
        }
    }
}

impl Drop for VirtualCamera {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSink(AtomicU64);

    impl FrameSink for CountingSink {
        fn on_frame(&self, _frame: Frame) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn gray_still() -> StillImage {
        StillImage::new(4, 4, PixelFormat::Gray8, vec![128u8; 16])
    }

    #[test]
    fn test_bind_refused() {
        let provider = VirtualCameraProvider::refusing("busy");
        let sink = Arc::new(CountingSink(AtomicU64::new(0)));
        let result = provider.bind(BindRequest::default(), sink);
        assert!(matches!(result, Err(SetupError::CameraUnavailable(_))));
    }

    #[test]
    fn test_without_cameras() {
        let provider = VirtualCameraProvider::without_cameras();
        assert!(provider.enumerate_cameras().is_empty());
    }

    #[test]
    fn test_frames_are_released_after_unbind() {
        let provider = VirtualCameraProvider::new(vec![gray_still()]).with_fps(200);
        let stats = provider.stats();
        let sink = Arc::new(CountingSink(AtomicU64::new(0)));

        let binding = provider
            .bind(BindRequest::default(), sink.clone())
            .expect("bind virtual camera");
        std::thread::sleep(Duration::from_millis(50));
        binding.unbind();

        assert!(sink.0.load(Ordering::SeqCst) > 0);
        assert_eq!(stats.produced(), sink.0.load(Ordering::SeqCst));
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn test_zoom_is_clamped_by_device() {
        let provider = VirtualCameraProvider::new(vec![gray_still()]);
        let sink = Arc::new(CountingSink(AtomicU64::new(0)));
        let binding = provider
            .bind(BindRequest::default(), sink)
            .expect("bind virtual camera");

        binding.set_zoom_ratio(2.5);
        assert_eq!(binding.zoom_ratio(), 2.5);
        binding.set_zoom_ratio(0.25);
        assert_eq!(binding.zoom_ratio(), 1.0);
        binding.set_zoom_ratio(100.0);
        assert_eq!(binding.zoom_ratio(), 8.0);

        assert_eq!(binding.torch_enabled(), Some(false));
        binding.enable_torch(true);
        assert_eq!(binding.torch_enabled(), Some(true));
        binding.unbind();
    }
}
