// src/gps/data.rs
//! GPS data structures: raw sentences and decoded position fixes

use std::fmt;

/// Replacement for bytes outside the ASCII range.
const REPLACEMENT: char = '\u{FFFD}';

/// One line of device output, ASCII-decoded and whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawSentence(String);

impl RawSentence {
    /// Decode raw bytes as ASCII, replacing every non-ASCII byte with U+FFFD.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let decoded: String = bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT })
            .collect();
        Self(decoded.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RawSentence {
    fn from(line: &str) -> Self {
        Self::from_bytes(line.as_bytes())
    }
}

impl fmt::Display for RawSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded position in signed degrees (negative = south / west).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    latitude: f64,
    longitude: f64,
}

impl PositionFix {
    pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
    pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

    /// Build a fix, rejecting coordinates outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if Self::LATITUDE_RANGE.contains(&latitude) && Self::LONGITUDE_RANGE.contains(&longitude) {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format coordinate for display
    pub fn format_coordinate(coord: f64) -> String {
        format!("{:>12.6}°", coord)
    }
}

impl fmt::Display for PositionFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
