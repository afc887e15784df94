// src/display/mod.rs
//! Presentation collaborators: the map view and the address label

pub mod terminal;

/// Label text before any address has been resolved.
pub const INITIAL_LABEL: &str = "LOCATION IS NOT FOUND";
/// Label text when reverse geocoding fails.
pub const ERROR_LABEL: &str = "ERROR";

/// A map that can be recentered and annotated with markers.
pub trait MapView {
    fn set_center(&mut self, lat: f64, lon: f64);

    fn add_marker(&mut self, lat: f64, lon: f64);
}

/// A single line of text describing the current location.
pub trait AddressLabel {
    fn set_text(&mut self, text: &str);
}

/// In-memory address label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelState {
    text: String,
}

impl LabelState {
    pub fn new() -> Self {
        Self {
            text: INITIAL_LABEL.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for LabelState {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressLabel for LabelState {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}
