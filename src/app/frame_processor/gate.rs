// SPDX-License-Identifier: GPL-3.0-only

//! Keep-only-latest frame admission
//!
//! The camera produces frames faster than the decoder can consume them.
//! The gate lets exactly one frame through at a time and releases every frame
//! that arrives while that one is still in flight. Nothing is ever queued.
//!
//! A frame stays "in flight" for as long as its [`AdmittedFrame`] lives: from
//! admission, through cropping and dispatch, until the decoder's completion
//! drops it. Dropping it on any path (success, decode failure, teardown)
//! reopens the gate.

use crate::backends::camera::Frame;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::trace;

/// Admission counters
#[derive(Debug, Default)]
struct GateCounters {
    admitted: AtomicU64,
    discarded: AtomicU64,
    invalid: AtomicU64,
}

/// Snapshot of the gate counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateStats {
    /// Frames let through
    pub admitted: u64,
    /// Frames released because another frame was in flight
    pub discarded: u64,
    /// Frames released because their buffer was unusable
    pub invalid: u64,
}

/// Single-slot frame gate
#[derive(Debug, Default)]
pub struct FrameGate {
    busy: Arc<AtomicBool>,
    counters: GateCounters,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to admit a frame
    ///
    /// Returns `None` (and releases the frame) when another frame is in flight
    /// or the frame's buffer is invalid. Never blocks.
    pub fn admit(&self, frame: Frame) -> Option<AdmittedFrame> {
        if !frame.is_valid() {
            self.counters.invalid.fetch_add(1, Ordering::Relaxed);
            trace!(
                width = frame.width,
                height = frame.height,
                bytes = frame.data.len(),
                "Dropping frame with invalid buffer"
            );
            return None;
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
            trace!("Frame in flight, discarding");
            return None;
        }

        self.counters.admitted.fetch_add(1, Ordering::Relaxed);
        Some(AdmittedFrame {
            frame,
            _permit: GatePermit {
                busy: Arc::clone(&self.busy),
            },
        })
    }

    /// Check whether a frame is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> GateStats {
        GateStats {
            admitted: self.counters.admitted.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
            invalid: self.counters.invalid.load(Ordering::Relaxed),
        }
    }
}

/// A frame that passed the gate
///
/// Field order matters: the frame is released before the permit reopens
/// the gate.
#[derive(Debug)]
pub struct AdmittedFrame {
    frame: Frame,
    _permit: GatePermit,
}

impl AdmittedFrame {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Release the frame and reopen the gate
    pub fn release(self) {
        drop(self);
    }
}

#[derive(Debug)]
struct GatePermit {
    busy: Arc<AtomicBool>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
