// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner
//!
//! Only [`SetupError`] ever crosses the boundary to the host application.
//! Decode failures are absorbed by the detection session and out-of-range
//! configuration is corrected silently.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Session could not be set up (fatal to the session)
    Setup(SetupError),
    /// Decoder reported a failure for one frame
    Decode(DecodeError),
    /// Launch options could not be parsed
    Config(ConfigError),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Fatal setup failures, reported to the host as an error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// The device has no usable camera
    NoCameraFound,
    /// The user denied the camera permission
    PermissionDenied,
    /// The camera provider refused to bind a camera
    CameraUnavailable(String),
    /// The controller was dropped before the session finished
    Cancelled,
}

/// Per-frame decoder failure (recoverable)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Crop could not be converted into the decoder's input format
    InvalidImage(String),
    /// Decoder backend failed while processing the image
    Backend(String),
    /// Decode task was cancelled or panicked before completing
    Interrupted(String),
}

/// Launch option errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Options were not valid JSON or had the wrong shape
    Malformed(String),
    /// Argument array did not contain an options object
    MissingOptions,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Setup(e) => write!(f, "Setup error: {}", e),
            AppError::Decode(e) => write!(f, "Decode error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NoCameraFound => write!(f, "No cameras found"),
            SetupError::PermissionDenied => write!(f, "Camera permission required"),
            SetupError::CameraUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            SetupError::Cancelled => write!(f, "Scan cancelled"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            DecodeError::Backend(msg) => write!(f, "Decoder failed: {}", msg),
            DecodeError::Interrupted(msg) => write!(f, "Decode interrupted: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Malformed(msg) => write!(f, "Malformed launch options: {}", msg),
            ConfigError::MissingOptions => write!(f, "Launch arguments contain no options object"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SetupError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for ConfigError {}

// Conversions from sub-errors to AppError
impl From<SetupError> for AppError {
    fn from(err: SetupError) -> Self {
        AppError::Setup(err)
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Decode(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DecodeError {
    fn from(err: tokio::task::JoinError) -> Self {
        DecodeError::Interrupted(err.to_string())
    }
}
