//! OSRM route service client.

use std::time::Duration;

use movi_common::new_correlation_id;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::geometry::{GeometrySource, LatLng, RouteGeometry};
use crate::{RoutingError, Stop};

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

pub struct OsrmClient {
    base_url: String,
    profile: String,
    http: reqwest::Client,
}

impl OsrmClient {
    pub fn new(
        base_url: impl AsRef<str>,
        profile: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RoutingError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            profile: profile.into(),
            http,
        })
    }

    /// Request URL for `stops`.
    pub fn route_url(&self, stops: &[Stop]) -> String {
        let coordinates = stops
            .iter()
            .map(|s| format!("{},{}", s.longitude, s.latitude))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.base_url, self.profile, coordinates
        )
    }

    /// Path through `stops`, falling back to straight lines on any failure.
    pub async fn fetch_geometry(&self, stops: &[Stop]) -> RouteGeometry {
        if stops.len() < 2 {
            return RouteGeometry::empty();
        }
        let request_id = new_correlation_id();
        match self.fetch_road(stops).await {
            Ok(points) => {
                debug!(request_id = %request_id, stops = stops.len(), points = points.len(), "road geometry");
                RouteGeometry {
                    points,
                    source: GeometrySource::Road,
                }
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "routing failed, drawing straight lines");
                RouteGeometry::straight_line(stops)
            }
        }
    }

    async fn fetch_road(&self, stops: &[Stop]) -> Result<Vec<LatLng>, RoutingError> {
        let response = self
            .http
            .get(self.route_url(stops))
            .send()
            .await
            .map_err(|e| RoutingError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }

        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::Malformed(e.to_string()))?;

        if body.code != "Ok" {
            return Err(RoutingError::NoRoute(
                body.message.unwrap_or(body.code),
            ));
        }
        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoRoute("response has no routes".to_string()))?;

        // GeoJSON is [lon, lat]
        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| LatLng { lat, lon })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> Vec<Stop> {
        vec![
            Stop::new("Depot", 12.9716, 77.5946),
            Stop::new("Market", 12.9600, 77.5800),
        ]
    }

    fn client(url: &str) -> OsrmClient {
        OsrmClient::new(url, "driving", Duration::from_secs(5)).unwrap()
    }

    const ROUTE_PATH: &str = "/route/v1/driving/77.5946,12.9716;77.58,12.96";

    #[test]
    fn url_uses_lon_lat_pairs() {
        let client = client("https://router.example.org/");
        assert_eq!(
            client.route_url(&stops()),
            "https://router.example.org/route/v1/driving/77.5946,12.9716;77.58,12.96?overview=full&geometries=geojson"
        );
    }

    #[tokio::test]
    async fn fewer_than_two_stops_is_empty_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client(&server.url());
        let geometry = client.fetch_geometry(&stops()[..1]).await;
        assert_eq!(geometry, RouteGeometry::empty());
        assert!(client.fetch_geometry(&[]).await.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn road_geometry_is_flipped_to_lat_lon() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", ROUTE_PATH)
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("overview".into(), "full".into()),
                mockito::Matcher::UrlEncoded("geometries".into(), "geojson".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"code":"Ok","routes":[{"geometry":{"type":"LineString",
                "coordinates":[[77.5946,12.9716],[77.59,12.965],[77.58,12.96]]}}]}"#,
            )
            .create_async()
            .await;

        let geometry = client(&server.url()).fetch_geometry(&stops()).await;
        mock.assert_async().await;
        assert_eq!(geometry.source, GeometrySource::Road);
        assert_eq!(geometry.points.len(), 3);
        assert_eq!(geometry.points[1], LatLng { lat: 12.965, lon: 77.59 });
    }

    #[tokio::test]
    async fn http_error_falls_back_to_straight_line() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ROUTE_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let geometry = client(&server.url()).fetch_geometry(&stops()).await;
        assert_eq!(geometry, RouteGeometry::straight_line(&stops()));
    }

    #[tokio::test]
    async fn no_route_code_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ROUTE_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":"NoRoute","message":"Impossible route between points"}"#)
            .create_async()
            .await;

        let geometry = client(&server.url()).fetch_geometry(&stops()).await;
        assert_eq!(geometry.source, GeometrySource::StraightLine);
        assert_eq!(geometry.points.len(), 2);
    }

    #[tokio::test]
    async fn malformed_body_and_missing_routes_fall_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ROUTE_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":"Ok","routes":[]}"#)
            .create_async()
            .await;
        let geometry = client(&server.url()).fetch_geometry(&stops()).await;
        assert_eq!(geometry.source, GeometrySource::StraightLine);

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ROUTE_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;
        let geometry = client(&server.url()).fetch_geometry(&stops()).await;
        assert_eq!(geometry.source, GeometrySource::StraightLine);
    }

    #[tokio::test]
    async fn unreachable_server_falls_back() {
        let client = OsrmClient::new("http://127.0.0.1:9", "driving", Duration::from_secs(2)).unwrap();
        let geometry = client.fetch_geometry(&stops()).await;
        assert_eq!(geometry.source, GeometrySource::StraightLine);
    }
}
