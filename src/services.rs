//! Remote service boundaries.
//!
//! The engine talks to four external services: free-text place search,
//! reverse geocoding, route geometry, and the turn-by-turn route guide.
//! Each is behind a trait so the session driver can run against in-memory
//! fakes under test and the reqwest implementations in production.

use async_trait::async_trait;

use crate::error::TrackError;
use crate::model::{Guide, Point};

/// Best-match result of a keyword place search.
#[derive(Debug, Clone)]
pub struct PlaceMatch {
    pub name: String,
    pub point: Point,
}

/// Free-text place search. Returns at most one best match; `None` means
/// the keyword resolved to nothing, which is a valid answer rather than
/// an error.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<Option<PlaceMatch>, TrackError>;
}

/// Coordinate to human-readable address composite
/// (road / subdistrict / district).
#[async_trait]
pub trait ReverseGeocode: Send + Sync {
    async fn resolve(&self, point: &Point) -> Result<String, TrackError>;
}

/// Route computation between two coordinates.
///
/// Geometry and guide are independent calls against services that may
/// disagree slightly in routing choice. The geometry is cosmetic (drawn
/// on the map); the guide is authoritative for instructions.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn geometry(&self, from: &Point, to: &Point) -> Result<Vec<Point>, TrackError>;
    async fn guide(&self, from: &Point, to: &Point) -> Result<Guide, TrackError>;
}
