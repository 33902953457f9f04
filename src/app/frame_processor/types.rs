// SPDX-License-Identifier: GPL-3.0-only

//! Core types for frame processing results
//!
//! These types describe what the decoder reports for a cropped frame.
//! Numeric values of [`BarcodeFormat`] and [`ValueType`] are part of the
//! host contract and match the values the host's JavaScript layer expects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode symbology
///
/// Each variant is a single bit so that a set of formats can be expressed
/// as a [`FormatMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    Code128,
    Code39,
    Code93,
    Codabar,
    DataMatrix,
    Ean13,
    Ean8,
    Itf,
    QrCode,
    UpcA,
    UpcE,
    Pdf417,
    Aztec,
}

impl BarcodeFormat {
    /// All formats, in ascending bit order
    pub const ALL: [BarcodeFormat; 13] = [
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Codabar,
        BarcodeFormat::DataMatrix,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::Itf,
        BarcodeFormat::QrCode,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
        BarcodeFormat::Pdf417,
        BarcodeFormat::Aztec,
    ];

    /// Bit value of this format inside a [`FormatMask`]
    pub fn bit(self) -> u32 {
        match self {
            BarcodeFormat::Code128 => 1,
            BarcodeFormat::Code39 => 2,
            BarcodeFormat::Code93 => 4,
            BarcodeFormat::Codabar => 8,
            BarcodeFormat::DataMatrix => 16,
            BarcodeFormat::Ean13 => 32,
            BarcodeFormat::Ean8 => 64,
            BarcodeFormat::Itf => 128,
            BarcodeFormat::QrCode => 256,
            BarcodeFormat::UpcA => 512,
            BarcodeFormat::UpcE => 1024,
            BarcodeFormat::Pdf417 => 2048,
            BarcodeFormat::Aztec => 4096,
        }
    }

    /// Look up a format from its bit value
    pub fn from_bit(bit: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.bit() == bit)
    }

    /// Integer code reported to the host
    pub fn code(self) -> i32 {
        self.bit() as i32
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BarcodeFormat::Code128 => "CODE_128",
            BarcodeFormat::Code39 => "CODE_39",
            BarcodeFormat::Code93 => "CODE_93",
            BarcodeFormat::Codabar => "CODABAR",
            BarcodeFormat::DataMatrix => "DATA_MATRIX",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::Ean8 => "EAN_8",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::UpcE => "UPC_E",
            BarcodeFormat::Pdf417 => "PDF417",
            BarcodeFormat::Aztec => "AZTEC",
        };
        f.write_str(name)
    }
}

/// Set of barcode formats the decoder should look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatMask(u32);

impl FormatMask {
    /// Mask substituted when the host passes `0`
    pub const DEFAULT: FormatMask = FormatMask(2 | 16); // CODE_39 | DATA_MATRIX

    /// Build a mask from raw host bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Build a mask from a list of formats
    pub fn from_formats(formats: &[BarcodeFormat]) -> Self {
        Self(formats.iter().fold(0, |acc, f| acc | f.bit()))
    }

    /// Raw bit value
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, format: BarcodeFormat) -> bool {
        self.0 & format.bit() != 0
    }

    /// Formats set in this mask
    pub fn formats(self) -> impl Iterator<Item = BarcodeFormat> {
        BarcodeFormat::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}

/// Semantic type of a decoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    #[default]
    Unknown,
    ContactInfo,
    Email,
    Isbn,
    Phone,
    Product,
    Sms,
    Text,
    Url,
    Wifi,
    Geo,
    CalendarEvent,
    DriverLicense,
}

impl ValueType {
    /// Integer code reported to the host
    pub fn code(self) -> i32 {
        match self {
            ValueType::Unknown => 0,
            ValueType::ContactInfo => 1,
            ValueType::Email => 2,
            ValueType::Isbn => 3,
            ValueType::Phone => 4,
            ValueType::Product => 5,
            ValueType::Sms => 6,
            ValueType::Text => 7,
            ValueType::Url => 8,
            ValueType::Wifi => 9,
            ValueType::Geo => 10,
            ValueType::CalendarEvent => 11,
            ValueType::DriverLicense => 12,
        }
    }

    /// Classify decoded content by its structure
    ///
    /// Recognises the URI schemes and envelope formats commonly encoded in
    /// 2-D symbols and falls back to `Text`.
    pub fn classify(content: &str) -> Self {
        let trimmed = content.trim();
        let upper = trimmed
            .chars()
            .take(16)
            .collect::<String>()
            .to_ascii_uppercase();

        if upper.starts_with("WIFI:") {
            return Self::Wifi;
        }

        if upper.starts_with("HTTP://") || upper.starts_with("HTTPS://") {
            return Self::Url;
        }

        if upper.starts_with("TEL:") {
            return Self::Phone;
        }

        if upper.starts_with("MAILTO:") || upper.starts_with("MATMSG:") {
            return Self::Email;
        }

        if upper.starts_with("SMS:") || upper.starts_with("SMSTO:") {
            return Self::Sms;
        }

        if let Some(rest) = trimmed.get(4..).filter(|_| upper.starts_with("GEO:")) {
            if is_geo_coordinates(rest) {
                return Self::Geo;
            }
        }

        if upper.starts_with("BEGIN:VCARD") || upper.starts_with("MECARD:") {
            return Self::ContactInfo;
        }

        if upper.starts_with("BEGIN:VCALENDAR") || upper.starts_with("BEGIN:VEVENT") {
            return Self::CalendarEvent;
        }

        // Bare domain names
        if trimmed.contains('.') && !trimmed.contains(' ') && trimmed.len() < 256 {
            let lower = trimmed.to_ascii_lowercase();
            if lower.starts_with("www.")
                || [".com", ".org", ".net", ".io"]
                    .iter()
                    .any(|tld| lower.ends_with(tld))
            {
                return Self::Url;
            }
        }

        Self::Text
    }
}

/// `lat,lon[,alt][?params]` with numeric coordinates
fn is_geo_coordinates(content: &str) -> bool {
    let coords = content.split_once('?').map_or(content, |(c, _)| c);
    let mut parts = coords.split(',');
    matches!(
        (parts.next(), parts.next()),
        (Some(lat), Some(lon))
            if lat.trim().parse::<f64>().is_ok() && lon.trim().parse::<f64>().is_ok()
    )
}

/// One symbol reported by the decoder for a cropped frame
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Value as text, `None` when the payload is not valid UTF-8
    pub raw_value: Option<String>,
    /// Raw payload bytes
    pub raw_bytes: Vec<u8>,
    /// Symbology of the detected code
    pub format: BarcodeFormat,
    /// Semantic type of the value
    pub value_type: ValueType,
}

impl RawDetection {
    /// Build a detection from the decoder's raw payload
    ///
    /// The text value is only populated when the bytes are valid UTF-8.
    pub fn from_bytes(raw_bytes: Vec<u8>, format: BarcodeFormat) -> Self {
        let raw_value = String::from_utf8(raw_bytes.clone()).ok();
        let value_type = raw_value
            .as_deref()
            .map(ValueType::classify)
            .unwrap_or(ValueType::Text);
        Self {
            raw_value,
            raw_bytes,
            format,
            value_type,
        }
    }

    /// Text value reported to the host
    ///
    /// Falls back to decoding the raw bytes as US-ASCII when the decoder
    /// could not produce a text value.
    pub fn value(&self) -> String {
        match &self.raw_value {
            Some(value) => value.clone(),
            None => decode_ascii(&self.raw_bytes),
        }
    }
}

/// Decode bytes as US-ASCII, replacing bytes above 0x7F with U+FFFD
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
        .collect()
}
