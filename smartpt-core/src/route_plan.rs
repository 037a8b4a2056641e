//! Route-plan models and collation rules
//!
//! `RouteResult` is the normalized shape of one transit route coming back
//! from the directions provider. Several variant queries are issued per
//! trip, so the same route can appear more than once; collation dedups by
//! a composite identity and orders fastest first.

use serde::{Deserialize, Serialize};

/// Line color used when the provider omits one
pub const DEFAULT_LINE_COLOR: &str = "#1976D2";
/// Line text color used when the provider omits one
pub const DEFAULT_LINE_TEXT_COLOR: &str = "#FFFFFF";

/// A human-readable value paired with its numeric form
/// (meters for distances, seconds for durations, epoch seconds for times)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitLine {
    pub name: String,
    pub short_name: String,
    pub color: String,
    pub text_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitStop {
    pub name: String,
    pub location: LatLng,
}

/// Transit metadata attached to a step travelled on a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitDetails {
    pub line: TransitLine,
    pub departure_stop: TransitStop,
    pub arrival_stop: TransitStop,
    pub departure_time: TextValue,
    pub arrival_time: TextValue,
    pub headsign: String,
    pub num_stops: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub distance: TextValue,
    pub duration: TextValue,
    pub html_instructions: String,
    pub travel_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_details: Option<TransitDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance: TextValue,
    pub duration: TextValue,
    pub start_address: String,
    pub end_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<TextValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<TextValue>,
    pub steps: Vec<RouteStep>,
}

/// One normalized route alternative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance: TextValue,
    pub duration: TextValue,
    pub legs: Vec<RouteLeg>,
    pub overview_polyline: String,
    pub summary: String,
    pub warnings: Vec<String>,
    pub waypoint_order: Vec<u32>,
}

impl RouteResult {
    /// Composite identity used to spot the same route coming back from
    /// different variant queries
    pub fn dedup_key(&self) -> (String, i64, i64) {
        (
            self.summary.clone(),
            self.duration.value,
            self.distance.value,
        )
    }
}

/// Transit modes the provider can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitMode {
    Bus,
    Train,
    Tram,
    Subway,
}

impl TransitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitMode::Bus => "bus",
            TransitMode::Train => "train",
            TransitMode::Tram => "tram",
            TransitMode::Subway => "subway",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingPreference {
    FewerTransfers,
    LessWalking,
}

impl RoutingPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingPreference::FewerTransfers => "fewer_transfers",
            RoutingPreference::LessWalking => "less_walking",
        }
    }
}

/// Mode restriction + routing preference for one variant query
#[derive(Debug, Clone, Copy)]
pub struct VariantPreference {
    pub modes: &'static [TransitMode],
    pub routing: RoutingPreference,
}

/// The fixed variant queries issued per trip: all modes favoring fewer
/// transfers, rail only favoring fewer transfers, bus and tram favoring
/// less walking.
pub const QUERY_VARIANTS: [VariantPreference; 3] = [
    VariantPreference {
        modes: &[
            TransitMode::Bus,
            TransitMode::Train,
            TransitMode::Tram,
            TransitMode::Subway,
        ],
        routing: RoutingPreference::FewerTransfers,
    },
    VariantPreference {
        modes: &[TransitMode::Train, TransitMode::Tram, TransitMode::Subway],
        routing: RoutingPreference::FewerTransfers,
    },
    VariantPreference {
        modes: &[TransitMode::Bus, TransitMode::Tram],
        routing: RoutingPreference::LessWalking,
    },
];

/// Drop routes whose (summary, duration, distance) identity was already
/// seen, keeping the first occurrence.
pub fn dedup_routes(routes: Vec<RouteResult>) -> Vec<RouteResult> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(routes.len());
    for route in routes {
        if seen.insert(route.dedup_key()) {
            out.push(route);
        }
    }
    out
}

/// Ascending by duration; the sort is stable so equal-duration routes
/// retain discovery order.
pub fn sort_routes(routes: &mut [RouteResult]) {
    routes.sort_by_key(|r| r.duration.value);
}

/// Fastest-first collation: dedup, then sort by duration
pub fn collate_routes(routes: Vec<RouteResult>) -> Vec<RouteResult> {
    let mut routes = dedup_routes(routes);
    sort_routes(&mut routes);
    routes
}
