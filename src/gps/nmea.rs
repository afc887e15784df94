// src/gps/nmea.rs
//! NMEA sentence recognition and RMC fix decoding

use super::data::{PositionFix, RawSentence};
use thiserror::Error;

/// Recommended-minimum sentence, the only one decoded for position.
pub const RMC_PREFIX: &str = "$GNRMC";
/// Fix-data sentence, accepted when detecting a device but never decoded.
pub const GGA_PREFIX: &str = "$GPGGA";
/// Prefixes that identify a port as a GPS receiver during discovery.
pub const DETECT_PREFIXES: [&str; 2] = [RMC_PREFIX, GGA_PREFIX];

// RMC field layout
const STATUS_FIELD: usize = 2;
const LAT_FIELD: usize = 3;
const LAT_DIR_FIELD: usize = 4;
const LON_FIELD: usize = 5;
const LON_DIR_FIELD: usize = 6;
const MIN_RMC_FIELDS: usize = LON_DIR_FIELD + 1;

const STATUS_VALID: &str = "A";

/// A recognized sentence that could not be turned into a fix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("expected at least {min} fields, found {found}", min = MIN_RMC_FIELDS)]
    TooFewFields { found: usize },

    #[error("invalid coordinate value {value:?}")]
    InvalidNumber { value: String },

    #[error("coordinate out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Result of decoding one well-formed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeOutcome {
    /// A valid RMC sentence with a position.
    Fix(PositionFix),
    /// An RMC sentence whose status flag is not `A`.
    InvalidFix,
    /// Anything that is not an RMC sentence.
    Ignored,
}

impl DecodeOutcome {
    pub fn fix(self) -> Option<PositionFix> {
        match self {
            DecodeOutcome::Fix(fix) => Some(fix),
            _ => None,
        }
    }
}

/// Check whether a line read during discovery looks like GPS output.
///
/// This is a plain prefix test on the two sentence types we know about,
/// not a full talker/sentence-id parse.
pub fn is_gps_sentence(sentence: &RawSentence) -> bool {
    DETECT_PREFIXES
        .iter()
        .any(|prefix| sentence.as_str().starts_with(prefix))
}

/// Decode a single line into a position fix.
///
/// Only `$GNRMC` lines are eligible; `$GPGGA` is recognized by
/// [`is_gps_sentence`] but yields [`DecodeOutcome::Ignored`] here.
pub fn decode(sentence: &RawSentence) -> Result<DecodeOutcome, DecodeError> {
    let line = sentence.as_str();
    if !line.starts_with(RMC_PREFIX) {
        return Ok(DecodeOutcome::Ignored);
    }

    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < MIN_RMC_FIELDS {
        return Err(DecodeError::TooFewFields { found: parts.len() });
    }

    if field(&parts, STATUS_FIELD) != STATUS_VALID {
        return Ok(DecodeOutcome::InvalidFix);
    }

    let latitude = convert_to_degrees(field(&parts, LAT_FIELD), field(&parts, LAT_DIR_FIELD))?;
    let longitude = convert_to_degrees(field(&parts, LON_FIELD), field(&parts, LON_DIR_FIELD))?;

    PositionFix::new(latitude, longitude)
        .map(DecodeOutcome::Fix)
        .ok_or(DecodeError::OutOfRange { latitude, longitude })
}

/// Convert an NMEA `[D]DDMM.MMMM` magnitude and hemisphere to signed degrees.
///
/// Degrees are every digit before the last two integer digits, so both the
/// two-digit latitude and three-digit longitude layouts are read correctly.
/// This deliberately differs from a fixed two-character degree split, which
/// would misread `DDDMM.MMMM` longitudes.
/// `S` and `W` negate the result; any other direction leaves it positive.
pub fn convert_to_degrees(value: &str, direction: &str) -> Result<f64, DecodeError> {
    let invalid = || DecodeError::InvalidNumber {
        value: value.to_string(),
    };

    let value = value.trim();
    if !value.is_ascii() {
        return Err(invalid());
    }

    let integer_len = value.find('.').unwrap_or(value.len());
    if integer_len < 3 {
        return Err(invalid());
    }

    let (degrees, minutes) = value.split_at(integer_len - 2);
    if !degrees.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !minutes.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        || minutes.bytes().filter(|&b| b == b'.').count() > 1
    {
        return Err(invalid());
    }

    let degrees = degrees.parse::<f64>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<f64>().map_err(|_| invalid())? / 60.0;

    let coord = degrees + minutes;
    Ok(match direction.trim() {
        "S" | "W" => -coord,
        _ => coord,
    })
}

/// Field text with any `*hh` checksum suffix removed.
fn field<'a>(parts: &[&'a str], index: usize) -> &'a str {
    parts[index].split('*').next().unwrap_or_default().trim()
}
