// SPDX-License-Identifier: MPL-2.0

//! Integration tests for frame admission and the detection session

use barcode_scan::app::frame_processor::{DetectionSession, FrameGate, ScanPipeline, SessionState};
use barcode_scan::backends::camera::{CroppedFrame, Frame, FrameSink, PixelFormat};
use barcode_scan::backends::decoder::{DecodeOutcome, Decoder};
use barcode_scan::errors::DecodeError;
use barcode_scan::{BarcodeFormat, RawDetection, ScanConfig, ScanOutcome};
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Decoder whose completions are released by the test
#[derive(Default)]
struct ManualDecoder {
    pending: Mutex<Vec<oneshot::Sender<DecodeOutcome>>>,
    calls: AtomicUsize,
}

impl ManualDecoder {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn complete(&self, index: usize, outcome: DecodeOutcome) {
        let sender = {
            let mut pending = self.pending.lock().unwrap();
            std::mem::replace(&mut pending[index], oneshot::channel().0)
        };
        let _ = sender.send(outcome);
    }
}

impl Decoder for ManualDecoder {
    fn process(&self, _image: CroppedFrame) -> BoxFuture<'static, DecodeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(tx);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(DecodeError::Interrupted("test dropped".into())))
        }
        .boxed()
    }
}

fn detection(value: &str) -> RawDetection {
    RawDetection::from_bytes(value.as_bytes().to_vec(), BarcodeFormat::QrCode)
}

fn tracked_frame(released: &Arc<AtomicUsize>) -> Frame {
    let released = Arc::clone(released);
    Frame::new(16, 16, PixelFormat::Gray8, vec![0u8; 256]).with_release(move || {
        released.fetch_add(1, Ordering::SeqCst);
    })
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_frame_arriving_during_decode_is_discarded() {
    let decoder = Arc::new(ManualDecoder::default());
    let (session, _outcome) =
        DetectionSession::new(ScanConfig::default(), decoder.clone(), Handle::current());
    let (pipeline, _worker) = ScanPipeline::spawn(Arc::clone(&session), &Handle::current());
    let released = Arc::new(AtomicUsize::new(0));
    session.start();

    pipeline.on_frame(tracked_frame(&released));
    wait_until(|| decoder.calls() == 1).await;

    // Frame k is still decoding, so frame k+1 goes straight back
    pipeline.on_frame(tracked_frame(&released));
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(pipeline.gate_stats().discarded, 1);
    assert_eq!(decoder.calls(), 1);

    // A failed decode releases frame k and keeps scanning
    decoder.complete(0, Err(DecodeError::Backend("no symbol".into())));
    wait_until(|| released.load(Ordering::SeqCst) == 2).await;
    assert_eq!(session.state(), SessionState::Scanning);

    pipeline.on_frame(tracked_frame(&released));
    wait_until(|| decoder.calls() == 2).await;
    assert_eq!(pipeline.gate_stats().admitted, 2);
}

#[tokio::test]
async fn test_out_of_order_successes_emit_once() {
    let decoder = Arc::new(ManualDecoder::default());
    let (session, outcome) =
        DetectionSession::new(ScanConfig::default(), decoder.clone(), Handle::current());
    let released = Arc::new(AtomicUsize::new(0));
    session.start();

    // Two separate gates so two decodes can be in flight at once
    let (gate_a, gate_b) = (FrameGate::new(), FrameGate::new());
    let first = gate_a.admit(tracked_frame(&released)).expect("first admitted");
    let second = gate_b.admit(tracked_frame(&released)).expect("second admitted");
    assert!(session.on_frame_admitted(first));
    assert!(session.on_frame_admitted(second));
    assert_eq!(decoder.calls(), 2);

    // The later submission finishes first and wins
    decoder.complete(1, Ok(vec![detection("second")]));
    wait_until(|| session.state() == SessionState::Completed).await;
    decoder.complete(0, Ok(vec![detection("first")]));
    wait_until(|| released.load(Ordering::SeqCst) == 2).await;

    match outcome.wait().await {
        Some(ScanOutcome::Completed(result)) => assert_eq!(result.value, "second"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.stats().ignored, 1);
    assert!(!gate_a.is_busy() && !gate_b.is_busy());
}

#[tokio::test]
async fn test_first_of_several_detections_wins() {
    let decoder = Arc::new(ManualDecoder::default());
    let (session, outcome) =
        DetectionSession::new(ScanConfig::default(), decoder.clone(), Handle::current());
    let (pipeline, worker) = ScanPipeline::spawn(Arc::clone(&session), &Handle::current());
    let released = Arc::new(AtomicUsize::new(0));
    session.start();

    pipeline.on_frame(tracked_frame(&released));
    wait_until(|| decoder.calls() == 1).await;
    decoder.complete(0, Ok(vec![detection("A"), detection("B")]));

    match outcome.wait().await {
        Some(ScanOutcome::Completed(result)) => {
            assert_eq!(result.value, "A");
            assert_eq!(result.format, 256);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Completed);
    worker.await.expect("worker stops after completion");

    // Once completed the decoder is never invoked again
    wait_until(|| released.load(Ordering::SeqCst) == 1).await;
    pipeline.on_frame(tracked_frame(&released));
    assert_eq!(released.load(Ordering::SeqCst), 2);
    assert_eq!(decoder.calls(), 1);
    assert!(!session.on_decode_complete(Ok(vec![detection("C")])));
}

#[tokio::test]
async fn test_invalid_frames_never_reach_decoder() {
    let decoder = Arc::new(ManualDecoder::default());
    let (session, _outcome) =
        DetectionSession::new(ScanConfig::default(), decoder.clone(), Handle::current());
    let (pipeline, _worker) = ScanPipeline::spawn(Arc::clone(&session), &Handle::current());
    session.start();

    pipeline.on_frame(Frame::new(16, 16, PixelFormat::RGBA, vec![0u8; 16]));
    pipeline.on_frame(Frame::new(16, 16, PixelFormat::Gray8, Vec::new()));
    pipeline.on_frame(Frame::new(u32::MAX / 2, 16, PixelFormat::RGBA, vec![0u8; 64]));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(pipeline.gate_stats().invalid, 3);
    assert_eq!(decoder.calls(), 0);
}
