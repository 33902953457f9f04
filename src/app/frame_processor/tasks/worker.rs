// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis pipeline
//!
//! Bridges the camera's frame callback to the detection session. The camera
//! side only ever performs a gate check and a non-blocking hand-off; cropping
//! and decoder dispatch happen on a single worker task.

use crate::app::frame_processor::gate::{AdmittedFrame, FrameGate, GateStats};
use crate::app::frame_processor::session::DetectionSession;
use crate::backends::camera::{Frame, FrameSink};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Frame sink feeding a detection session
pub struct ScanPipeline {
    gate: FrameGate,
    session: Arc<DetectionSession>,
    frames: mpsc::Sender<AdmittedFrame>,
}

impl ScanPipeline {
    /// Create the pipeline and spawn its worker on `runtime`
    ///
    /// The worker exits once the session reaches a terminal state or the
    /// pipeline is dropped.
    pub fn spawn(session: Arc<DetectionSession>, runtime: &Handle) -> (Arc<Self>, JoinHandle<()>) {
        // The gate already limits this to one frame; the slot only decouples
        // the producer from the worker's wakeup.
        let (frames, rx) = mpsc::channel(1);
        let worker = runtime.spawn(run_worker(Arc::clone(&session), rx));

        let pipeline = Arc::new(Self {
            gate: FrameGate::new(),
            session,
            frames,
        });
        (pipeline, worker)
    }

    pub fn gate_stats(&self) -> GateStats {
        self.gate.stats()
    }

    pub fn session(&self) -> &Arc<DetectionSession> {
        &self.session
    }
}

impl FrameSink for ScanPipeline {
    fn on_frame(&self, frame: Frame) {
        if !self.session.is_scanning() {
            return;
        }

        let Some(admitted) = self.gate.admit(frame) else {
            return;
        };

        if self.frames.try_send(admitted).is_err() {
            trace!("Detection worker unavailable, releasing frame");
        }
    }
}

async fn run_worker(session: Arc<DetectionSession>, mut frames: mpsc::Receiver<AdmittedFrame>) {
    let mut state = session.subscribe();
    debug!("Detection worker started");

    loop {
        let finished = async {
            let _ = state.wait_for(|s| s.is_terminal()).await;
        };

        tokio::select! {
            biased;
            _ = finished => break,
            admitted = frames.recv() => match admitted {
                Some(admitted) => {
                    session.on_frame_admitted(admitted);
                }
                None => break,
            },
        }
    }

    // Frames still queued are released when the receiver drops
    frames.close();
    debug!(state = ?session.state(), "Detection worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::payload::ScanOutcome;
    use crate::app::frame_processor::types::{BarcodeFormat, RawDetection};
    use crate::backends::camera::{CroppedFrame, PixelFormat};
    use crate::backends::decoder::{DecodeOutcome, Decoder};
    use crate::config::ScanConfig;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ImmediateDecoder {
        calls: Arc<AtomicUsize>,
    }

    impl Decoder for ImmediateDecoder {
        fn process(&self, _image: CroppedFrame) -> BoxFuture<'static, DecodeOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(vec![RawDetection::from_bytes(
                    b"HELLO".to_vec(),
                    BarcodeFormat::QrCode,
                )])
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_pipeline_completes_and_stops_worker() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = Arc::new(ImmediateDecoder {
            calls: Arc::clone(&calls),
        });
        let (session, outcome) =
            DetectionSession::new(ScanConfig::default(), decoder, Handle::current());
        let (pipeline, worker) = ScanPipeline::spawn(Arc::clone(&session), &Handle::current());

        // Not scanning yet: frames are dropped before the gate
        pipeline.on_frame(Frame::new(8, 8, PixelFormat::Gray8, vec![0u8; 64]));
        assert_eq!(pipeline.gate_stats().admitted, 0);

        session.start();
        pipeline.on_frame(Frame::new(8, 8, PixelFormat::Gray8, vec![0u8; 64]));

        match outcome.wait().await {
            Some(ScanOutcome::Completed(result)) => assert_eq!(result.value, "HELLO"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        worker.await.expect("worker task");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        pipeline.on_frame(Frame::new(8, 8, PixelFormat::Gray8, vec![0u8; 64]));
        assert_eq!(pipeline.gate_stats().admitted, 1);
    }
}
