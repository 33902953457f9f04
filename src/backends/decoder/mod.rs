// SPDX-License-Identifier: GPL-3.0-only

//! Barcode decoder abstraction
//!
//! A decoder takes a cropped frame and asynchronously reports zero or more
//! raw detections, or an error. The returned future may complete on any
//! thread; the detection session does not care where.

pub mod qr;

pub use qr::QrDecoder;

use crate::app::frame_processor::types::RawDetection;
use crate::backends::camera::CroppedFrame;
use crate::errors::DecodeError;
use futures::future::BoxFuture;

/// Result of decoding one cropped frame
pub type DecodeOutcome = Result<Vec<RawDetection>, DecodeError>;

/// Asynchronous barcode decoding capability
pub trait Decoder: Send + Sync {
    /// Start decoding `image`
    ///
    /// Must return without doing the heavy work inline: the caller is the
    /// single detection worker and expects to be free again immediately.
    fn process(&self, image: CroppedFrame) -> BoxFuture<'static, DecodeOutcome>;
}
