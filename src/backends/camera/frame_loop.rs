// SPDX-License-Identifier: GPL-3.0-only
//! Thread lifecycle management for frame producers
//!
//! Camera backends that produce frames on their own thread use
//! [`FrameLoopController`] to start, pace and stop that thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Action returned by the loop callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a frame producer loop running in a separate thread
///
/// # Example
///
/// ```ignore
/// let controller = FrameLoopController::start("virtual-camera", Duration::from_millis(33), || {
///     sink.on_frame(next_frame());
///     LoopAction::Continue
/// });
///
/// // Later, stop the loop
/// controller.stop();
/// ```
pub struct FrameLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    /// Name for logging
    name: String,
}

impl FrameLoopController {
    /// Start a new loop in a separate thread
    ///
    /// `loop_fn` is called once per `interval` (or back to back with a zero
    /// interval) until it returns [`LoopAction::Stop`] or the controller is
    /// stopped.
    pub fn start<F>(name: &str, interval: Duration, mut loop_fn: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_signal);
        let thread_name = name.to_string();

        info!(name = %name, interval_ms = interval.as_millis(), "Starting frame loop");

        let thread_handle = thread::spawn(move || {
            debug!(name = %thread_name, "Frame loop thread started");

            loop {
                if thread_stop.load(Ordering::SeqCst) {
                    debug!(name = %thread_name, "Stop signal received");
                    break;
                }

                let started = Instant::now();
                if loop_fn() == LoopAction::Stop {
                    debug!(name = %thread_name, "Loop requested stop");
                    break;
                }

                if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                    thread::sleep(remaining);
                }
            }

            info!(name = %thread_name, "Frame loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting for it
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting frame loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        let Some(handle) = self.thread_handle.take() else {
            return;
        };

        // A loop callback may end up stopping its own controller
        if handle.thread().id() == thread::current().id() {
            debug!(name = %self.name, "Stop requested from inside the frame loop, detaching");
            return;
        }

        debug!(name = %self.name, "Waiting for frame loop thread to finish");
        if let Err(e) = handle.join() {
            warn!(name = %self.name, "Frame loop thread panicked: {:?}", e);
        } else {
            debug!(name = %self.name, "Frame loop thread finished");
        }
    }
}

impl Drop for FrameLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "FrameLoopController dropped, stopping loop");
            self.stop();
        }
    }
}
