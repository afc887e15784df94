// src/error.rs
//! Error types for the GPS tracker

use crate::gps::nmea::DecodeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A single port could not be opened during discovery.
    #[error("Port {port} unavailable: {source}")]
    PortUnavailable {
        port: String,
        #[source]
        source: Box<TrackerError>,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Geocoding error: {0}")]
    Geocode(String),

    #[error("Error: {0}")]
    Other(String),
}

impl TrackerError {
    pub fn port_unavailable(port: impl Into<String>, source: TrackerError) -> Self {
        TrackerError::PortUnavailable {
            port: port.into(),
            source: Box::new(source),
        }
    }
}
