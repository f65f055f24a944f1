//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from a GeoJSON position, which is ordered `[lon, lat]`
    pub fn from_geojson(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] if lat.is_finite() && lon.is_finite() => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }
}

/// Standard response envelope status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    NoData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_position_is_lon_lat() {
        let coords = GpsCoordinates::from_geojson(&[-99.14, 30.04]).unwrap();
        assert_eq!(coords.latitude, 30.04);
        assert_eq!(coords.longitude, -99.14);
    }

    #[test]
    fn test_geojson_position_with_altitude() {
        let coords = GpsCoordinates::from_geojson(&[-99.14, 30.04, 512.0]).unwrap();
        assert_eq!(coords.latitude, 30.04);
    }

    #[test]
    fn test_short_position_is_rejected() {
        assert!(GpsCoordinates::from_geojson(&[-99.14]).is_none());
        assert!(GpsCoordinates::from_geojson(&[]).is_none());
    }

    #[test]
    fn test_response_status_wire_format() {
        assert_eq!(serde_json::to_string(&ResponseStatus::NoData).unwrap(), "\"no_data\"");
        assert_eq!(serde_json::to_string(&ResponseStatus::Ok).unwrap(), "\"ok\"");
    }
}
