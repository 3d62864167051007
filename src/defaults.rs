//! Map constants and the names scripts see

/// Equatorial circumference of the web-mercator sphere (2·π·6378137)
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_016.685_578_49;

/// Edge length of a map tile in pixels
pub const TILE_SIZE: f64 = 256.0;

/// Global under which scene globals are installed
pub const GLOBAL_NAME: &str = "global";

/// Global holding the current feature's properties
pub const FEATURE_NAME: &str = "feature";

/// Ground meters covered by one pixel at `zoom`
pub fn meters_per_pixel(zoom: f64, tile_size: f64) -> f64 {
    EARTH_CIRCUMFERENCE_METERS * (-zoom).exp2() / tile_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_zero_tile_spans_the_equator() {
        assert!((meters_per_pixel(0.0, TILE_SIZE) * TILE_SIZE - EARTH_CIRCUMFERENCE_METERS).abs() < 1e-6);
    }

    #[test]
    fn each_zoom_halves_the_resolution() {
        let z10 = meters_per_pixel(10.0, TILE_SIZE);
        let z11 = meters_per_pixel(11.0, TILE_SIZE);
        assert!((z10 / z11 - 2.0).abs() < 1e-12);
    }
}
