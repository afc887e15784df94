// src/geocode.rs
//! Reverse geocoding through a Nominatim-compatible HTTP service

use crate::{
    error::{Result, TrackerError},
    gps::data::PositionFix,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Label text when the service answers without an address.
pub const UNKNOWN_LOCATION: &str = "LOCATION NOT KNOWN";

/// Resolves a coordinate into a human-readable address.
pub trait ReverseGeocoder {
    fn reverse(&self, fix: &PositionFix) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl ReverseResponse {
    fn into_address(self) -> String {
        self.display_name
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }
}

/// Blocking client for the `/reverse` endpoint of Nominatim.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::blocking::Client,
    base_url: String,
    zoom: u8,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, zoom: u8, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Geocode(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            zoom,
        })
    }

    fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url)
    }
}

impl ReverseGeocoder for NominatimClient {
    fn reverse(&self, fix: &PositionFix) -> Result<String> {
        let zoom = self.zoom.to_string();
        let lat = fix.latitude().to_string();
        let lon = fix.longitude().to_string();

        let response = self
            .client
            .get(self.reverse_url())
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", zoom.as_str()),
                ("addressdetails", "1"),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(TrackerError::Geocode(format!("HTTP error: {}", response.status())));
        }

        let address = response.json::<ReverseResponse>()?.into_address();
        debug!(%fix, %address, "Reverse geocoded");
        Ok(address)
    }
}

/// Labels a fix with its own coordinates; used when lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatesOnly;

impl ReverseGeocoder for CoordinatesOnly {
    fn reverse(&self, fix: &PositionFix) -> Result<String> {
        Ok(fix.to_string())
    }
}
