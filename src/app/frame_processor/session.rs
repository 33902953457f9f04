// SPDX-License-Identifier: GPL-3.0-only

//! Single-shot detection session
//!
//! Tracks the session lifecycle and turns the first successful decode into
//! the terminal result.
//!
//! ```text
//!            start()                first detection
//!   Idle ─────────────▶ Scanning ─────────────────────▶ Completed
//!     │                    │
//!     │ abort(error)       │ abort(error)
//!     └────────────────────┴───────────────────────────▶ Aborted
//! ```
//!
//! Every transition is a compare-and-swap on the state, so of several decode
//! completions racing to finish the session exactly one wins and emits the
//! outcome. Everything that loses becomes a no-op.

use crate::app::frame_processor::gate::AdmittedFrame;
use crate::app::frame_processor::geometry::compute_rects;
use crate::app::frame_processor::tasks::crop::crop_frame;
use crate::app::payload::{ScanOutcome, ScanResult};
use crate::backends::decoder::{DecodeOutcome, Decoder};
use crate::config::ScanConfig;
use crate::errors::SetupError;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, trace, warn};

/// Lifecycle state of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Scanning = 1,
    Completed = 2,
    Aborted = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SessionState::Scanning,
            2 => SessionState::Completed,
            3 => SessionState::Aborted,
            _ => SessionState::Idle,
        }
    }

    /// Completed and Aborted are final
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Aborted)
    }
}

/// Snapshot of the session counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    /// Crops handed to the decoder
    pub dispatched: u64,
    /// Completions that reported an error
    pub failed: u64,
    /// Completions that arrived after the session ended
    pub ignored: u64,
}

#[derive(Debug, Default)]
struct SessionCounters {
    dispatched: AtomicU64,
    failed: AtomicU64,
    ignored: AtomicU64,
}

/// Shared session handle
///
/// Owned jointly by the controller, the frame worker and every in-flight
/// decode completion.
pub struct DetectionSession {
    config: ScanConfig,
    decoder: Arc<dyn Decoder>,
    runtime: Handle,
    state: AtomicU8,
    state_tx: watch::Sender<SessionState>,
    outcome_tx: Mutex<Option<oneshot::Sender<ScanOutcome>>>,
    counters: SessionCounters,
}

impl DetectionSession {
    /// Create an idle session
    ///
    /// Decode completions are driven on `runtime`. The returned receiver
    /// resolves with the session's only outcome.
    pub fn new(
        config: ScanConfig,
        decoder: Arc<dyn Decoder>,
        runtime: Handle,
    ) -> (Arc<Self>, OutcomeReceiver) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (state_tx, _) = watch::channel(SessionState::Idle);

        let session = Arc::new(Self {
            config,
            decoder,
            runtime,
            state: AtomicU8::new(SessionState::Idle as u8),
            state_tx,
            outcome_tx: Mutex::new(Some(outcome_tx)),
            counters: SessionCounters::default(),
        });

        (session, OutcomeReceiver { rx: outcome_rx })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_scanning(&self) -> bool {
        self.state() == SessionState::Scanning
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
        }
    }

    /// Idle → Scanning, once the camera is bound
    ///
    /// Returns `false` if the session was not idle.
    pub fn start(&self) -> bool {
        if !self.transition(SessionState::Idle, SessionState::Scanning) {
            debug!(state = ?self.state(), "Session not idle, ignoring start");
            return false;
        }

        info!(
            formats = self.config.format_mask.bits(),
            roi_ratio = self.config.roi_ratio,
            "Scanning started"
        );
        true
    }

    /// Abort a session that has not finished yet
    ///
    /// Returns `false` when the session already reached a terminal state; the
    /// earlier outcome stands.
    pub fn abort(&self, error: SetupError) -> bool {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if SessionState::from_u8(current).is_terminal() {
                    None
                } else {
                    Some(SessionState::Aborted as u8)
                }
            });

        match previous {
            Ok(previous) => {
                warn!(
                    error = %error,
                    from = ?SessionState::from_u8(previous),
                    "Scan session aborted"
                );
                self.state_tx.send_replace(SessionState::Aborted);
                self.emit(ScanOutcome::Aborted(error));
                true
            }
            Err(_) => {
                debug!(error = %error, "Session already finished, ignoring abort");
                false
            }
        }
    }

    /// Crop an admitted frame and hand it to the decoder
    ///
    /// The frame is held until the decode completes and is then released,
    /// whatever the outcome. Returns `true` if a decode was dispatched.
    pub fn on_frame_admitted(self: &Arc<Self>, admitted: AdmittedFrame) -> bool {
        if !self.is_scanning() {
            trace!("Session not scanning, releasing frame");
            return false;
        }

        let frame = admitted.frame();
        let (crop_rect, _) = compute_rects(frame.width, frame.height, self.config.roi_ratio);
        let Some(crop) = crop_frame(frame, crop_rect) else {
            debug!(
                width = frame.width,
                height = frame.height,
                "Frame too small for region of interest, releasing"
            );
            return false;
        };

        trace!(
            width = crop.width,
            height = crop.height,
            rotation = %crop.rotation,
            "Dispatching crop to decoder"
        );
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        let decode = self.decoder.process(crop);

        let session = Arc::clone(self);
        self.runtime.spawn(async move {
            let outcome = decode.await;
            let latency_ms = admitted.frame().captured_at.elapsed().as_millis() as u64;
            if session.on_decode_complete(outcome) {
                debug!(latency_ms, "Result decoded from frame");
            } else {
                trace!(latency_ms, "Decode completed");
            }
            admitted.release();
        });

        true
    }

    /// Handle a decoder completion
    ///
    /// Returns `true` only for the completion that finished the session.
    pub fn on_decode_complete(&self, outcome: DecodeOutcome) -> bool {
        let detections = match outcome {
            Ok(detections) => detections,
            Err(error) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %error, "Decode failed, continuing to scan");
                return false;
            }
        };

        let Some(first) = detections.first() else {
            return false;
        };

        if !self.transition(SessionState::Scanning, SessionState::Completed) {
            self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            debug!(state = ?self.state(), "Late detection ignored");
            return false;
        }

        if detections.len() > 1 {
            debug!(count = detections.len(), "Several detections in one frame, keeping the first");
        }

        let result = ScanResult::from_detection(first);
        info!(
            format = %first.format,
            value_type = result.value_type,
            "Barcode detected"
        );
        self.state_tx.send_replace(SessionState::Completed);
        self.emit(ScanOutcome::Completed(result));
        true
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let swapped = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if swapped && !to.is_terminal() {
            self.state_tx.send_replace(to);
        }
        swapped
    }

    fn emit(&self, outcome: ScanOutcome) {
        let sender = self
            .outcome_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    debug!("Outcome receiver dropped");
                }
            }
            None => warn!("Outcome already emitted"),
        }
    }
}

impl std::fmt::Debug for DetectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionSession")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Receiving end of the session outcome
#[derive(Debug)]
pub struct OutcomeReceiver {
    rx: oneshot::Receiver<ScanOutcome>,
}

impl OutcomeReceiver {
    /// Wait for the session to finish
    ///
    /// Returns `None` if the session was dropped without an outcome.
    pub async fn wait(self) -> Option<ScanOutcome> {
        self.rx.await.ok()
    }

    /// Non-blocking check for a finished session
    pub fn try_take(&mut self) -> Option<ScanOutcome> {
        self.rx.try_recv().ok()
    }
}
