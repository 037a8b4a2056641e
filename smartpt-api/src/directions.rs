//! Mapping-provider clients: directions and geocoding
//!
//! The wire shapes here mirror the provider's JSON; normalization into the
//! core `RouteResult` happens as soon as a response is parsed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use smartpt_core::route_plan::{
    LatLng, RouteLeg, RouteResult, RouteStep, RoutingPreference, TextValue, TransitDetails,
    TransitLine, TransitMode, TransitStop, DEFAULT_LINE_COLOR, DEFAULT_LINE_TEXT_COLOR,
};

use crate::config::Config;
use crate::error::ApiError;

/// One directions query: endpoints plus the variant preferences
#[derive(Debug, Clone)]
pub struct DirectionsQuery {
    pub origin: String,
    pub destination: String,
    /// Epoch seconds; provider default (now) when absent
    pub departure_time: Option<i64>,
    pub modes: Vec<TransitMode>,
    pub routing: RoutingPreference,
}

/// Trait for the external directions provider
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Run one transit-mode directions query, returning every route
    /// alternative the provider offers, already normalized
    async fn fetch_routes(&self, query: &DirectionsQuery) -> Result<Vec<RouteResult>, ApiError>;
}

/// A geocoding match
#[derive(Debug, Clone, Serialize)]
pub struct GeocodeResult {
    pub place_id: String,
    pub formatted_address: String,
    pub name: String,
    pub location: LatLng,
}

/// Trait for the external geocoding provider
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, ApiError>;

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeocodeResult>, ApiError>;
}

// ---------------------------------------------------------------------------
// Provider wire shapes

#[derive(Debug, Deserialize)]
struct WireTextValue {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    value: Option<i64>,
}

impl WireTextValue {
    fn normalize(self) -> TextValue {
        TextValue {
            text: self.text.unwrap_or_default(),
            value: self.value.unwrap_or(0),
        }
    }
}

fn normalize_opt(value: Option<WireTextValue>) -> TextValue {
    value
        .map(WireTextValue::normalize)
        .unwrap_or(TextValue {
            text: String::new(),
            value: 0,
        })
}

#[derive(Debug, Deserialize)]
struct WireLine {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    text_color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireStop {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<LatLng>,
}

impl WireStop {
    fn normalize(self) -> TransitStop {
        TransitStop {
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or(LatLng { lat: 0.0, lng: 0.0 }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTransitDetails {
    #[serde(default)]
    line: Option<WireLine>,
    #[serde(default)]
    departure_stop: Option<WireStop>,
    #[serde(default)]
    arrival_stop: Option<WireStop>,
    #[serde(default)]
    departure_time: Option<WireTextValue>,
    #[serde(default)]
    arrival_time: Option<WireTextValue>,
    #[serde(default)]
    headsign: Option<String>,
    #[serde(default)]
    num_stops: Option<u32>,
}

impl WireTransitDetails {
    fn normalize(self) -> TransitDetails {
        let line = self.line.unwrap_or(WireLine {
            name: None,
            short_name: None,
            color: None,
            text_color: None,
        });
        TransitDetails {
            line: TransitLine {
                name: line.name.unwrap_or_default(),
                short_name: line.short_name.unwrap_or_default(),
                color: line.color.unwrap_or_else(|| DEFAULT_LINE_COLOR.to_string()),
                text_color: line
                    .text_color
                    .unwrap_or_else(|| DEFAULT_LINE_TEXT_COLOR.to_string()),
            },
            departure_stop: self
                .departure_stop
                .map(WireStop::normalize)
                .unwrap_or_else(|| WireStop { name: None, location: None }.normalize()),
            arrival_stop: self
                .arrival_stop
                .map(WireStop::normalize)
                .unwrap_or_else(|| WireStop { name: None, location: None }.normalize()),
            departure_time: normalize_opt(self.departure_time),
            arrival_time: normalize_opt(self.arrival_time),
            headsign: self.headsign.unwrap_or_default(),
            num_stops: self.num_stops.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireStep {
    #[serde(default)]
    distance: Option<WireTextValue>,
    #[serde(default)]
    duration: Option<WireTextValue>,
    #[serde(default)]
    html_instructions: Option<String>,
    #[serde(default)]
    travel_mode: Option<String>,
    #[serde(default)]
    transit_details: Option<WireTransitDetails>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    distance: Option<WireTextValue>,
    #[serde(default)]
    duration: Option<WireTextValue>,
    #[serde(default)]
    start_address: Option<String>,
    #[serde(default)]
    end_address: Option<String>,
    #[serde(default)]
    departure_time: Option<WireTextValue>,
    #[serde(default)]
    arrival_time: Option<WireTextValue>,
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WirePolyline {
    #[serde(default)]
    points: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    legs: Vec<WireLeg>,
    #[serde(default)]
    overview_polyline: Option<WirePolyline>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    waypoint_order: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct WireDirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<WireRoute>,
    #[serde(default)]
    error_message: Option<String>,
}

fn normalize_route(route: WireRoute) -> RouteResult {
    let legs: Vec<RouteLeg> = route
        .legs
        .into_iter()
        .map(|leg| RouteLeg {
            distance: normalize_opt(leg.distance),
            duration: normalize_opt(leg.duration),
            start_address: leg.start_address.unwrap_or_default(),
            end_address: leg.end_address.unwrap_or_default(),
            departure_time: leg.departure_time.map(WireTextValue::normalize),
            arrival_time: leg.arrival_time.map(WireTextValue::normalize),
            steps: leg
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    distance: normalize_opt(step.distance),
                    duration: normalize_opt(step.duration),
                    html_instructions: step.html_instructions.unwrap_or_default(),
                    travel_mode: step.travel_mode.unwrap_or_default(),
                    transit_details: step.transit_details.map(WireTransitDetails::normalize),
                })
                .collect(),
        })
        .collect();

    // Top-level distance and duration come from the first leg
    let (distance, duration) = legs
        .first()
        .map(|leg| (leg.distance.clone(), leg.duration.clone()))
        .unwrap_or((
            TextValue {
                text: String::new(),
                value: 0,
            },
            TextValue {
                text: String::new(),
                value: 0,
            },
        ));

    RouteResult {
        distance,
        duration,
        legs,
        overview_polyline: route
            .overview_polyline
            .and_then(|p| p.points)
            .unwrap_or_default(),
        summary: route.summary.unwrap_or_default(),
        warnings: route.warnings,
        waypoint_order: route.waypoint_order,
    }
}

#[derive(Debug, Deserialize)]
struct WireGeocodeResult {
    place_id: String,
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<WireAddressComponent>,
    geometry: WireGeometry,
}

#[derive(Debug, Deserialize)]
struct WireAddressComponent {
    long_name: String,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct WireGeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<WireGeocodeResult>,
}

fn normalize_geocode(result: WireGeocodeResult) -> GeocodeResult {
    let name = result
        .address_components
        .first()
        .map(|c| c.long_name.clone())
        .unwrap_or_else(|| result.formatted_address.clone());
    GeocodeResult {
        place_id: result.place_id,
        formatted_address: result.formatted_address,
        name,
        location: result.geometry.location,
    }
}

// ---------------------------------------------------------------------------
// HTTP client

/// Region bias for forward geocoding
const GEOCODE_REGION_SUFFIX: &str = ", Victoria, Australia";
const GEOCODE_COMPONENTS: &str = "country:AU|administrative_area:Victoria";

/// HTTP client for the mapping provider (directions + geocoding)
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.maps_api_key.clone(),
            base_url: "https://maps.googleapis.com".to_string(),
        }
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key
            .as_deref()
            .ok_or(ApiError::MissingCredential("GOOGLE_MAPS_API_KEY"))
    }

    async fn geocode_query(&self, params: &[(&str, String)]) -> Result<WireGeocodeResponse, ApiError> {
        let response = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Upstream {
                status: 500,
                message: format!("Geocoding request failed: {}", e),
            })?;

        response.json().await.map_err(|e| ApiError::Upstream {
            status: 502,
            message: format!("Geocoding response invalid: {}", e),
        })
    }
}

#[async_trait]
impl DirectionsProvider for GoogleMapsClient {
    async fn fetch_routes(&self, query: &DirectionsQuery) -> Result<Vec<RouteResult>, ApiError> {
        let key = self.api_key()?;

        let transit_mode = query
            .modes
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("|");

        let mut params = vec![
            ("origin", query.origin.clone()),
            ("destination", query.destination.clone()),
            ("mode", "transit".to_string()),
            ("alternatives", "true".to_string()),
            ("transit_mode", transit_mode),
            (
                "transit_routing_preference",
                query.routing.as_str().to_string(),
            ),
            ("key", key.to_string()),
        ];
        if let Some(departure_time) = query.departure_time {
            params.push(("departure_time", departure_time.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/maps/api/directions/json", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| ApiError::Upstream {
                status: 500,
                message: format!("Directions request failed: {}", e),
            })?;

        let body: WireDirectionsResponse =
            response.json().await.map_err(|e| ApiError::Upstream {
                status: 502,
                message: format!("Directions response invalid: {}", e),
            })?;

        if body.status != "OK" {
            let detail = match body.error_message {
                Some(message) => format!("Directions API error: {} ({})", body.status, message),
                None => format!("Directions API error: {}", body.status),
            };
            return Err(ApiError::Upstream {
                status: 502,
                message: detail,
            });
        }

        Ok(body.routes.into_iter().map(normalize_route).collect())
    }
}

#[async_trait]
impl GeocodingProvider for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, ApiError> {
        let key = self.api_key()?.to_string();

        // Constrain to Victoria first, matching how riders type stops
        let constrained = self
            .geocode_query(&[
                ("address", format!("{}{}", address, GEOCODE_REGION_SUFFIX)),
                ("components", GEOCODE_COMPONENTS.to_string()),
                ("key", key.clone()),
            ])
            .await?;

        let body = match constrained.status.as_str() {
            "OK" => constrained,
            // Retry unconstrained before giving up
            "ZERO_RESULTS" => {
                let fallback = self
                    .geocode_query(&[("address", address.to_string()), ("key", key)])
                    .await?;
                match fallback.status.as_str() {
                    "OK" | "ZERO_RESULTS" => fallback,
                    status => {
                        return Err(ApiError::Upstream {
                            status: 502,
                            message: format!("Geocoding failed: {}", status),
                        })
                    }
                }
            }
            status => {
                return Err(ApiError::Upstream {
                    status: 502,
                    message: format!("Geocoding failed: {}", status),
                })
            }
        };

        Ok(body.results.into_iter().map(normalize_geocode).collect())
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeocodeResult>, ApiError> {
        let key = self.api_key()?.to_string();

        let body = self
            .geocode_query(&[("latlng", format!("{},{}", lat, lng)), ("key", key)])
            .await?;

        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {
                Ok(body.results.into_iter().map(normalize_geocode).collect())
            }
            status => Err(ApiError::Upstream {
                status: 502,
                message: format!("Reverse geocoding failed: {}", status),
            }),
        }
    }
}
