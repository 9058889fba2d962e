use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned geographic box. Serialized the way tile tables write it:
/// `[[south, west], [north, east]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south()
            && point.lat <= self.north()
            && point.lng >= self.west()
            && point.lng <= self.east()
    }
}

impl From<[[f64; 2]; 2]> for LatLngBounds {
    fn from([[south, west], [north, east]]: [[f64; 2]; 2]) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }
}

impl From<LatLngBounds> for [[f64; 2]; 2] {
    fn from(bounds: LatLngBounds) -> Self {
        [
            [bounds.south(), bounds.west()],
            [bounds.north(), bounds.east()],
        ]
    }
}
