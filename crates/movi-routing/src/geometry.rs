use serde::Serialize;

use crate::Stop;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

/// Where a geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    /// Fewer than two stops; nothing to draw.
    Empty,
    /// Road path from the routing service.
    Road,
    /// Direct segments between consecutive stops.
    StraightLine,
}

/// Polyline to draw for a route, in `(lat, lon)` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGeometry {
    pub points: Vec<LatLng>,
    pub source: GeometrySource,
}

impl RouteGeometry {
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            source: GeometrySource::Empty,
        }
    }

    pub fn straight_line(stops: &[Stop]) -> Self {
        Self {
            points: stops.iter().map(Stop::position).collect(),
            source: GeometrySource::StraightLine,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
