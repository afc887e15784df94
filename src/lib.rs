// src/lib.rs
//! GPS Tracker Library
//!
//! Finds a serial GPS receiver, decodes RMC fixes and hands them to a map
//! view and a reverse-geocoded address label.

pub mod config;
pub mod display;
pub mod error;
pub mod geocode;
pub mod gps;
pub mod logging;
pub mod map;
pub mod monitor;

// Re-export main types for convenience
pub use error::{Result, TrackerError};
pub use gps::{PositionFix, RawSentence};
pub use monitor::{CycleOutcome, TrackerSession};
