//! Route geometry for the fleet map.
//!
//! Road-following paths come from an OSRM server. When OSRM cannot answer,
//! the route is drawn as straight segments through the stops so the map
//! always has something to show.

mod geometry;
mod osrm;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use geometry::{GeometrySource, LatLng, RouteGeometry};
pub use osrm::OsrmClient;

/// A stop on a route, as the dashboard stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default)]
    pub stop_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Stop {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            stop_id: None,
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("invalid coordinate '{0}', expected lon,lat")]
    InvalidCoordinate(String),
    #[error("routing request failed: {0}")]
    Http(String),
    #[error("routing service returned HTTP {0}")]
    Status(u16),
    #[error("no route: {0}")]
    NoRoute(String),
    #[error("malformed routing response: {0}")]
    Malformed(String),
}

/// Parses `lon,lat`, the order OSRM uses.
impl FromStr for Stop {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RoutingError::InvalidCoordinate(s.to_string());
        let (lon, lat) = s.split_once(',').ok_or_else(invalid)?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid());
        }
        Ok(Stop::new(String::new(), lat, lon))
    }
}
