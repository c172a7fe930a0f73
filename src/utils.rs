//! Utility functions for confdiff
//!
//! Formatting helpers for unit-aware values and text normalization used by
//! the loader.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use crate::utils::{format_bytes, format_millis};
//!
//! println!("Size: {}", format_bytes(1536)); // "1.50 KB"
//! println!("Timeout: {}", format_millis(90_000)); // "1m 30s"
//! ```

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Format bytes in human-readable form
///
/// Converts a byte count into a human-readable string using appropriate
/// units (B, KB, MB, GB, TB, PB). Uses 1024 as the conversion factor
/// following binary conventions.
///
/// # Example
///
/// ```rust,ignore
/// use crate::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1023), "1023 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1_048_576), "1.00 MB");
/// ```
///
/// # Formatting Rules
///
/// - Values less than 1024 bytes are shown as whole numbers with "B"
/// - Larger values are shown with 2 decimal places and appropriate units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a millisecond count as a duration in words, e.g. `"1h 30m"`
pub fn format_millis(millis: u64) -> String {
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

/// Apply `format` to the magnitude of `value`, keeping its sign
///
/// Hadoop configurations use `-1` and friends as "unlimited" markers, so
/// negative numbers are formatted rather than rejected.
pub fn format_signed(value: i64, format: impl Fn(u64) -> String) -> String {
    if value < 0 {
        format!("-{}", format(value.unsigned_abs()))
    } else {
        format(value.unsigned_abs())
    }
}

/// Collapse a multi-line description into a single line
///
/// Newlines become spaces, runs of spaces collapse into one and the result
/// is trimmed.
pub fn normalize_description(raw: &str) -> String {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let spaces = SPACES.get_or_init(|| Regex::new(" +").expect("static regex"));
    let single_line = raw.replace(['\r', '\n'], " ");
    spaces.replace_all(&single_line, " ").trim().to_string()
}
