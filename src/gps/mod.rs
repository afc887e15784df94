// src/gps/mod.rs
//! GPS device discovery and NMEA decoding

pub mod data;
pub mod device;
pub mod nmea;

pub use data::{PositionFix, RawSentence};
