//! Human-readable labels for export statistics

const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// Format a byte count at powers-of-1024 thresholds, keeping at most one
/// decimal place
pub fn byte_label(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}
