// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=BARCODE_SCAN_VERSION");

    // Packagers can pin the version explicitly
    let version = match std::env::var("BARCODE_SCAN_VERSION") {
        Ok(v) => v,
        Err(_) => git_version().unwrap_or_else(package_version),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

fn package_version() -> String {
    std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string())
}

/// `git describe` output reshaped as:
/// - "0.1.0-abcdef1" when HEAD sits on tag v0.1.0
/// - "0.1.0-dirty-abcdef1" when HEAD is past it
fn git_version() -> Option<String> {
    let described = git(&["describe", "--tags", "--match", "v*"])?;
    let described = described.strip_prefix('v').unwrap_or(&described);
    let hash = git(&["rev-parse", "--short", "HEAD"])?;

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() == 3 {
        Some(format!("{}-dirty-{}", parts[2], hash))
    } else {
        Some(format!("{}-{}", described, hash))
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
