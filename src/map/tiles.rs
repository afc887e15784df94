// src/map/tiles.rs
//! Slippy-map tile arithmetic for the OpenStreetMap tile grid

use std::f64::consts::PI;

/// Web Mercator cannot show the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Calculate tile coordinates from lat/lon and zoom level
pub fn lat_lon_to_tile(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    let n = 2_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = ((lon + 180.0) / 360.0 * n).floor().clamp(0.0, max_index);
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max_index);

    (x as u32, y as u32)
}

pub fn tile_url(zoom: u8, x: u32, y: u32) -> String {
    format!("https://tile.openstreetmap.org/{}/{}/{}.png", zoom, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coordinates() {
        // Munich at zoom 10
        assert_eq!(lat_lon_to_tile(48.1173, 11.5167, 10), (544, 355));
    }

    #[test]
    fn test_origin_tile() {
        assert_eq!(lat_lon_to_tile(0.0, 0.0, 1), (1, 1));
    }

    #[test]
    fn test_edges_stay_on_grid() {
        assert_eq!(lat_lon_to_tile(90.0, 180.0, 2), (3, 0));
        assert_eq!(lat_lon_to_tile(-90.0, -180.0, 2), (0, 3));
    }

    #[test]
    fn test_tile_url() {
        assert_eq!(tile_url(12, 1234, 5678), "https://tile.openstreetmap.org/12/1234/5678.png");
    }
}
