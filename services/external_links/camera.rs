//! Virtual camera distance for 3D viewers that take a camera range instead
//! of a zoom level.

pub const EARTH_PERIMETER_M: f64 = 40_075_016.0;
pub const TILE_SIZE_PX: f64 = 256.0;
/// Vertical field of view assumed for the external viewer, in degrees.
pub const VIEW_ANGLE_DEG: f64 = 35.0;

/// Web-Mercator ground resolution in meters per pixel.
pub fn mercator_pixel_size(lat: f64, zoom: f64) -> f64 {
    EARTH_PERIMETER_M / (TILE_SIZE_PX * 2f64.powf(zoom)) * lat.to_radians().cos()
}

/// Distance, in pixels, from which a window `window_height_px` tall spans
/// the view angle.
pub fn distance_in_pixels(window_height_px: f64) -> f64 {
    window_height_px / 2.0 / (VIEW_ANGLE_DEG.to_radians() / 2.0).tan()
}

/// Camera range above the terrain at the view center.
pub fn camera_distance(lat: f64, zoom: f64, window_height_px: f64, elevation_m: f64) -> f64 {
    distance_in_pixels(window_height_px) * mercator_pixel_size(lat, zoom) + elevation_m
}
