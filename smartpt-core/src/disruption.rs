//! Disruption report model and merge rules
//!
//! Reports are append-only: a confirmation of an existing disruption is a
//! new row carrying `confirms = <original id>`, never an update in place.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Reports older than this are treated as expired by listing surfaces
pub const ACTIVE_WINDOW_HOURS: i64 = 2;

/// A second report for the same route and location inside this window is a duplicate
pub const DUPLICATE_WINDOW_HOURS: i64 = 24;

/// Impact level of a disruption
///
/// The derived order (Low < Medium < High) is what the escalation rule
/// relies on; keep the variants in ascending order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(Error::InvalidSeverity(other.to_string())),
        }
    }
}

/// Kind of service problem being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionKind {
    Delay,
    Cancellation,
    ServiceChange,
    TrackWork,
    Other,
}

impl DisruptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisruptionKind::Delay => "delay",
            DisruptionKind::Cancellation => "cancellation",
            DisruptionKind::ServiceChange => "service_change",
            DisruptionKind::TrackWork => "track_work",
            DisruptionKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "delay" => Ok(DisruptionKind::Delay),
            "cancellation" => Ok(DisruptionKind::Cancellation),
            "service_change" => Ok(DisruptionKind::ServiceChange),
            "track_work" => Ok(DisruptionKind::TrackWork),
            "other" => Ok(DisruptionKind::Other),
            other => Err(Error::InvalidKind(other.to_string())),
        }
    }
}

/// A user-submitted record describing a transit service problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisruptionReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub route_number: String,
    pub location: String,
    pub severity: Severity,
    pub description: String,
    pub disruption: DisruptionKind,
    pub user_id: String,
    /// Whether the reporter flagged a ticket inspector nearby
    #[serde(default)]
    pub inspector: bool,
    /// Set on confirmation rows: the id of the report being corroborated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirms: Option<String>,
}

impl DisruptionReport {
    /// Whether this report is older than the active window
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.created_at < now - Duration::hours(ACTIVE_WINDOW_HOURS)
    }
}

/// Severity escalation: never decreases when combining reports
pub fn merge_severity(current: Severity, candidate: Severity) -> Severity {
    current.max(candidate)
}

/// Description merge: replaced only by a strictly longer candidate
pub fn merge_description<'a>(current: &'a str, candidate: &'a str) -> &'a str {
    if candidate.len() > current.len() {
        candidate
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_at(created_at: DateTime<Utc>) -> DisruptionReport {
        DisruptionReport {
            id: "r1".to_string(),
            created_at,
            route_number: "86".to_string(),
            location: "Bourke St/Swanston St".to_string(),
            severity: Severity::Low,
            description: "minor delay".to_string(),
            disruption: DisruptionKind::Delay,
            user_id: "u1".to_string(),
            inspector: false,
            confirms: None,
        }
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["low", "medium", "high"] {
            assert_eq!(Severity::parse(s).unwrap().as_str(), s);
        }
        for s in ["delay", "cancellation", "service_change", "track_work", "other"] {
            assert_eq!(DisruptionKind::parse(s).unwrap().as_str(), s);
        }
        assert!(Severity::parse("critical").is_err());
        assert!(DisruptionKind::parse("strike").is_err());
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        assert!(!report_at(now - Duration::minutes(119)).is_expired(now));
        assert!(report_at(now - Duration::minutes(121)).is_expired(now));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_value(DisruptionKind::ServiceChange).unwrap();
        assert_eq!(json, serde_json::json!("service_change"));
        let json = serde_json::to_value(Severity::High).unwrap();
        assert_eq!(json, serde_json::json!("high"));
    }
}
