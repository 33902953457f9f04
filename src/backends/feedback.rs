// SPDX-License-Identifier: GPL-3.0-only

//! Success feedback
//!
//! Audio and haptic feedback belong to the host platform. The scanner only
//! decides when to ask for it: once, after a session completes, and only for
//! the kinds the launch options enabled.

use crate::config::ScanConfig;
use crate::constants::feedback::VIBRATION_DURATION;
use std::time::Duration;
use tracing::info;

/// Platform feedback capability
pub trait SuccessFeedback: Send + Sync {
    fn beep(&self);

    fn vibrate(&self, duration: Duration);
}

/// Feedback that only logs, used where no audio or haptics exist
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl SuccessFeedback for LogFeedback {
    fn beep(&self) {
        info!("Beep");
    }

    fn vibrate(&self, duration: Duration) {
        info!(duration_ms = duration.as_millis(), "Vibrate");
    }
}

/// Play the feedback enabled in `config`
pub fn play_success(config: &ScanConfig, feedback: &dyn SuccessFeedback) {
    if config.beep_on_success {
        feedback.beep();
    }
    if config.vibrate_on_success {
        feedback.vibrate(VIBRATION_DURATION);
    }
}
