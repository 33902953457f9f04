// SPDX-License-Identifier: GPL-3.0-only

//! Scan controller
//!
//! Owns one scan from launch to result: permission and camera checks,
//! binding the camera to the analysis pipeline, the guide overlay, and
//! teardown once the session ends.

use crate::app::frame_processor::session::{DetectionSession, OutcomeReceiver, SessionState};
use crate::app::frame_processor::tasks::ScanPipeline;
use crate::app::handlers::gestures::GestureController;
use crate::app::payload::ScanOutcome;
use crate::app::scan_overlay::{OverlayRenderer, OverlaySurface};
use crate::backends::camera::{BindRequest, CameraBinding, CameraProvider, FrameSink};
use crate::backends::decoder::Decoder;
use crate::backends::feedback::{LogFeedback, SuccessFeedback, play_success};
use crate::config::{PreviewTransform, ScanConfig};
use crate::errors::SetupError;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Camera permission as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The host is prompting the user; the answer arrives through
    /// [`ScanController::on_permission_result`]
    Pending,
}

type Overlay = OverlayRenderer<Box<dyn OverlaySurface>>;

/// Drives a single scan session
pub struct ScanController {
    session: Arc<DetectionSession>,
    runtime: Handle,
    outcome: Option<OutcomeReceiver>,
    pipeline: Arc<ScanPipeline>,
    worker: Option<JoinHandle<()>>,
    release: Option<JoinHandle<()>>,
    binding: Option<Arc<dyn CameraBinding>>,
    overlay: Option<Overlay>,
    feedback: Arc<dyn SuccessFeedback>,
}

impl ScanController {
    /// Create a controller and spawn its detection worker on `runtime`
    pub fn new(config: ScanConfig, decoder: Arc<dyn Decoder>, runtime: Handle) -> Self {
        let (session, outcome) = DetectionSession::new(config, decoder, runtime.clone());
        let (pipeline, worker) = ScanPipeline::spawn(Arc::clone(&session), &runtime);

        Self {
            session,
            runtime,
            outcome: Some(outcome),
            pipeline,
            worker: Some(worker),
            release: None,
            binding: None,
            overlay: None,
            feedback: Arc::new(LogFeedback),
        }
    }

    pub fn with_feedback(mut self, feedback: Arc<dyn SuccessFeedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        self.session.config()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &Arc<DetectionSession> {
        &self.session
    }

    pub fn pipeline(&self) -> &Arc<ScanPipeline> {
        &self.pipeline
    }

    /// Begin the scan
    ///
    /// A device without cameras aborts before anything else happens.
    pub fn start(&mut self, provider: &dyn CameraProvider, permission: PermissionStatus) {
        let cameras = provider.enumerate_cameras();
        if cameras.is_empty() {
            self.session.abort(SetupError::NoCameraFound);
            return;
        }
        debug!(count = cameras.len(), "Cameras available");

        match permission {
            PermissionStatus::Granted => self.bind_camera(provider),
            PermissionStatus::Denied => {
                self.session.abort(SetupError::PermissionDenied);
            }
            PermissionStatus::Pending => info!("Waiting for camera permission"),
        }
    }

    /// Answer to a pending permission request
    pub fn on_permission_result(&mut self, provider: &dyn CameraProvider, granted: bool) {
        if !granted {
            self.session.abort(SetupError::PermissionDenied);
            return;
        }

        info!("Camera permission granted");
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.redraw();
        }
        self.bind_camera(provider);
    }

    fn bind_camera(&mut self, provider: &dyn CameraProvider) {
        if self.binding.is_some() || self.session.state().is_terminal() {
            return;
        }

        let sink: Arc<dyn FrameSink> = self.pipeline.clone();
        match provider.bind(BindRequest::default(), sink) {
            Ok(binding) => {
                info!("Camera bound to analysis pipeline");
                let release = release_on_finish(self.session.subscribe(), Arc::clone(&binding));
                self.release = Some(self.runtime.spawn(release));
                self.binding = Some(binding);
                if !self.session.start() {
                    debug!("Session ended while binding, camera released with it");
                }
            }
            Err(error) => {
                self.session.abort(error);
            }
        }
    }

    /// Gesture handling for the bound camera
    ///
    /// Before binding every gesture is a no-op.
    pub fn gestures(&self) -> GestureController<dyn CameraBinding> {
        GestureController::new(self.binding.clone())
    }

    /// Attach the overlay surface and draw the guide
    pub fn attach_overlay(&mut self, surface: Box<dyn OverlaySurface>) {
        let mut overlay = OverlayRenderer::new(surface, self.session.config().roi_ratio);
        overlay.redraw();
        self.overlay = Some(overlay);
    }

    /// Viewport size changed
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.on_geometry_changed(width, height),
            None => debug!(width, height, "No overlay attached, ignoring resize"),
        }
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn preview_transform(&self) -> PreviewTransform {
        self.session.config().preview_transform()
    }

    /// Wait for the session to end, then release the camera
    ///
    /// Returns once the camera is unbound and the worker has stopped. Success
    /// feedback plays once, after a completed scan. Returns `None` if the
    /// outcome was already taken.
    pub async fn finish(&mut self) -> Option<ScanOutcome> {
        let outcome = self.outcome.take()?.wait().await;
        self.teardown();

        if let Some(release) = self.release.take()
            && let Err(e) = release.await
        {
            warn!(error = %e, "Camera release task failed");
        }
        if let Some(worker) = self.worker.take()
            && let Err(e) = worker.await
        {
            warn!(error = %e, "Detection worker failed");
        }

        if let Some(ScanOutcome::Completed(result)) = &outcome {
            info!(format = result.format, value_type = result.value_type, "Scan completed");
            play_success(self.session.config(), self.feedback.as_ref());
        }
        outcome
    }

    /// End the session if it is still running
    ///
    /// The terminal state stops the worker and lets `release_on_finish`
    /// unbind the camera off the async threads.
    fn teardown(&mut self) {
        if !self.session.state().is_terminal() {
            warn!(state = ?self.session.state(), "Scan ended before the session finished");
            self.session.abort(SetupError::Cancelled);
        }
        self.binding = None;
    }
}

/// Unbind the camera as soon as the session reaches a terminal state
async fn release_on_finish(
    mut state: watch::Receiver<SessionState>,
    binding: Arc<dyn CameraBinding>,
) {
    let _ = state.wait_for(|s| s.is_terminal()).await;

    // Unbinding may join the producer thread
    match tokio::task::spawn_blocking(move || binding.unbind()).await {
        Ok(()) => debug!("Camera unbound"),
        Err(e) => warn!(error = %e, "Failed to unbind camera after the session ended"),
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.teardown();
    }
}
