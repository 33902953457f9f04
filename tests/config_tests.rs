// SPDX-License-Identifier: MPL-2.0

//! Integration tests for launch options and scan configuration

use barcode_scan::{BarcodeFormat, FormatMask, LaunchOptions, ScanConfig};

#[test]
fn test_config_default() {
    let config = ScanConfig::default();

    assert_eq!(config.format_mask, FormatMask::DEFAULT);
    assert_eq!(config.roi_ratio, 0.5);
    assert!(!config.mirror_preview, "Preview should not be mirrored by default");
    assert!(!config.beep_on_success);
    assert!(!config.vibrate_on_success);
}

#[test]
fn test_full_options_object() {
    let options = LaunchOptions::from_json(
        r#"{
            "barcodeFormats": 256,
            "detectorSize": 0.3,
            "rotateCamera": true,
            "beepOnSuccess": true,
            "vibrateOnSuccess": false
        }"#,
    )
    .expect("valid options");
    let config = ScanConfig::from_options(&options);

    assert!(config.format_mask.contains(BarcodeFormat::QrCode));
    assert_eq!(config.format_mask.formats().count(), 1);
    assert_eq!(config.roi_ratio, 0.3);
    assert!(config.mirror_preview);
    assert!(config.beep_on_success);
    assert!(!config.vibrate_on_success);
}

#[test]
fn test_zero_mask_uses_default_formats() {
    let options = LaunchOptions::from_json(r#"{"barcodeFormats": 0}"#).expect("valid options");
    let config = ScanConfig::from_options(&options);
    assert_eq!(config.format_mask.bits(), 2 | 16);
}

#[test]
fn test_out_of_range_detector_size_is_replaced() {
    for size in ["1.5", "0", "-0.2", "1"] {
        let json = format!(r#"{{"detectorSize": {}}}"#, size);
        let options = LaunchOptions::from_json(&json).expect("valid options");
        assert_eq!(
            ScanConfig::from_options(&options).roi_ratio,
            0.5,
            "detectorSize {} should fall back to 0.5",
            size
        );
    }
}

#[test]
fn test_unknown_keys_are_ignored() {
    let options =
        LaunchOptions::from_json(r#"{"orientation": "portrait"}"#).expect("valid options");
    assert_eq!(options, LaunchOptions::default());
}

#[test]
fn test_host_argument_array() {
    let options = LaunchOptions::from_json(r#"[{"rotateCamera": true}]"#).expect("valid options");
    assert!(options.rotate_camera);
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(LaunchOptions::from_json("{not json").is_err());
    assert!(LaunchOptions::from_json(r#"{"detectorSize": "big"}"#).is_err());
}
