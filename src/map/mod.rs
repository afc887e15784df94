// src/map/mod.rs
//! In-memory map model: center, zoom and dropped markers

mod tiles;

pub use tiles::{lat_lon_to_tile, tile_url};

use crate::display::MapView;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
}

/// Map state as a widget would hold it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    markers: Vec<Marker>,
}

impl MapState {
    pub fn new(zoom: u8) -> Self {
        Self {
            center_lat: 0.0,
            center_lon: 0.0,
            zoom,
            markers: Vec::new(),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// OSM tile (x, y) under the current center.
    pub fn center_tile(&self) -> (u32, u32) {
        lat_lon_to_tile(self.center_lat, self.center_lon, self.zoom)
    }
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl MapView for MapState {
    fn set_center(&mut self, lat: f64, lon: f64) {
        self.center_lat = lat;
        self.center_lon = lon;
    }

    fn add_marker(&mut self, lat: f64, lon: f64) {
        self.markers.push(Marker { lat, lon });
    }
}
