//! HTTP implementations of the remote services.
//!
//! Place search, reverse geocoding, and the route guide go to the keyed
//! map-service API; the drawable path geometry comes from an OSRM-style
//! routing endpoint. Response DTOs are deserialized with serde and
//! converted into model types at the boundary, so the rest of the engine
//! never sees wire shapes.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::TrackingConfig;
use crate::error::TrackError;
use crate::model::{Guide, GuideStep, Point, TurnKind};
use crate::services::{PlaceMatch, PlaceSearch, ReverseGeocode, RouteProvider};

const SEARCH_URL: &str = "https://search.longdo.com/mapsearch/json/search";
const ADDRESS_URL: &str = "https://api.longdo.com/map/services/address";
const GUIDE_URL: &str = "https://api.longdo.com/RouteService/json/route/guide";
const OSRM_URL: &str = "https://router.project-osrm.org/route/v1/driving";

/// One client for all four services. Endpoint bases are parameters so a
/// staging deployment or a local mock can stand in.
pub struct HttpServices {
    client: reqwest::Client,
    api_key: String,
    locale: String,
    search_url: String,
    address_url: String,
    guide_url: String,
    osrm_url: String,
}

impl HttpServices {
    pub fn new(config: &TrackingConfig) -> Self {
        HttpServices {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            locale: config.locale.clone(),
            search_url: SEARCH_URL.to_string(),
            address_url: ADDRESS_URL.to_string(),
            guide_url: GUIDE_URL.to_string(),
            osrm_url: OSRM_URL.to_string(),
        }
    }

    pub fn with_endpoints(
        mut self,
        search: impl Into<String>,
        address: impl Into<String>,
        guide: impl Into<String>,
        osrm: impl Into<String>,
    ) -> Self {
        self.search_url = search.into();
        self.address_url = address.into();
        self.guide_url = guide.into();
        self.osrm_url = osrm.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    name: String,
    lat: f64,
    lon: f64,
}

impl SearchResponse {
    fn into_best_match(self) -> Option<PlaceMatch> {
        self.data.into_iter().next().map(|hit| PlaceMatch {
            name: hit.name,
            point: Point { lat: hit.lat, lon: hit.lon },
        })
    }
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(default)]
    road: Option<String>,
    #[serde(default)]
    subdistrict: Option<String>,
    #[serde(default)]
    district: Option<String>,
}

impl AddressResponse {
    /// Join the present components into one display string.
    fn composite(self) -> String {
        [self.road, self.subdistrict, self.district]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct GuideResponse {
    #[serde(default)]
    data: Vec<GuideRoute>,
}

#[derive(Debug, Deserialize)]
struct GuideRoute {
    /// Total route distance in meters.
    distance: f64,
    /// Total route duration in seconds.
    interval: f64,
    #[serde(default)]
    guide: Vec<GuideWireStep>,
}

#[derive(Debug, Deserialize)]
struct GuideWireStep {
    turn: u32,
    distance: f64,
    #[serde(default)]
    name: String,
    lat: f64,
    lon: f64,
}

impl GuideResponse {
    fn into_guide(self) -> Option<Guide> {
        let route = self.data.into_iter().next()?;
        Some(Guide {
            steps: route
                .guide
                .into_iter()
                .map(|s| GuideStep {
                    distance_m: s.distance,
                    turn: TurnKind::from_wire(s.turn),
                    point: Point { lat: s.lat, lon: s.lon },
                    name: s.name,
                })
                .collect(),
            total_distance_m: route.distance,
            total_duration_s: route.interval,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: [lon, lat].
    coordinates: Vec<[f64; 2]>,
}

impl OsrmResponse {
    fn into_points(self) -> Result<Vec<Point>, TrackError> {
        if self.code != "Ok" {
            return Err(TrackError::RouteFetch(format!("routing status {}", self.code)));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| TrackError::RouteFetch("no route in response".into()))?;
        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Point { lat, lon })
            .collect())
    }
}

#[async_trait]
impl PlaceSearch for HttpServices {
    async fn search(&self, keyword: &str) -> Result<Option<PlaceMatch>, TrackError> {
        let response: SearchResponse = self
            .client
            .get(self.search_url.as_str())
            .query(&[("keyword", keyword), ("limit", "1"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| TrackError::PlaceSearch(e.to_string()))?
            .error_for_status()
            .map_err(|e| TrackError::PlaceSearch(e.to_string()))?
            .json()
            .await
            .map_err(|e| TrackError::PlaceSearch(e.to_string()))?;

        Ok(response.into_best_match())
    }
}

#[async_trait]
impl ReverseGeocode for HttpServices {
    async fn resolve(&self, point: &Point) -> Result<String, TrackError> {
        let response: AddressResponse = self
            .client
            .get(self.address_url.as_str())
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
                ("noelevation", "1".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| TrackError::Geocoding(e.to_string()))?
            .error_for_status()
            .map_err(|e| TrackError::Geocoding(e.to_string()))?
            .json()
            .await
            .map_err(|e| TrackError::Geocoding(e.to_string()))?;

        Ok(response.composite())
    }
}

#[async_trait]
impl RouteProvider for HttpServices {
    async fn geometry(&self, from: &Point, to: &Point) -> Result<Vec<Point>, TrackError> {
        let url = format!(
            "{}/{},{};{},{}",
            self.osrm_url, from.lon, from.lat, to.lon, to.lat
        );
        let response: OsrmResponse = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await
            .map_err(|e| TrackError::RouteFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| TrackError::RouteFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| TrackError::RouteFetch(e.to_string()))?;

        response.into_points()
    }

    async fn guide(&self, from: &Point, to: &Point) -> Result<Guide, TrackError> {
        let response: GuideResponse = self
            .client
            .get(self.guide_url.as_str())
            .query(&[
                ("flat", from.lat.to_string()),
                ("flon", from.lon.to_string()),
                ("tlat", to.lat.to_string()),
                ("tlon", to.lon.to_string()),
                ("mode", "d".to_string()),
                ("locale", self.locale.clone()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| TrackError::RouteFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| TrackError::RouteFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| TrackError::RouteFetch(e.to_string()))?;

        response
            .into_guide()
            .ok_or_else(|| TrackError::RouteFetch("no route in guide response".into()))
    }
}
