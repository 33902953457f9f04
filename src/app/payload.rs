// SPDX-License-Identifier: GPL-3.0-only

//! Result payloads handed back to the host
//!
//! The host receives a positional array: `[value, format, valueType]` on
//! success and `[error, "", ""]` on failure, so both shapes line up.

use crate::app::frame_processor::types::RawDetection;
use crate::errors::SetupError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A successful scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub value: String,
    pub format: i32,
    pub value_type: i32,
}

impl ScanResult {
    /// Build the payload for a detection, applying the ASCII fallback
    pub fn from_detection(detection: &RawDetection) -> Self {
        Self {
            value: detection.value(),
            format: detection.format.code(),
            value_type: detection.value_type.code(),
        }
    }
}

/// Terminal outcome of a scan session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanResult),
    Aborted(SetupError),
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Completed(_))
    }

    /// Positional argument array for the host callback
    pub fn to_host_args(&self) -> Value {
        match self {
            ScanOutcome::Completed(result) => {
                json!([result.value, result.format, result.value_type])
            }
            ScanOutcome::Aborted(error) => json!([error.to_string(), "", ""]),
        }
    }
}
