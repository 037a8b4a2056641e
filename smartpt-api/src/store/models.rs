//! Data models for gateway storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartpt_core::{DisruptionKind, DisruptionReport, Severity};

use crate::auth::AuthUser;

/// A validated report ready to be inserted
#[derive(Debug, Clone)]
pub struct NewDisruptionReport {
    pub route_number: String,
    pub location: String,
    pub severity: Severity,
    pub description: String,
    pub disruption: DisruptionKind,
    pub user_id: String,
    pub inspector: bool,
}

/// A confirmation row: corroborates `confirms` with already-merged
/// severity and description
#[derive(Debug, Clone)]
pub struct NewConfirmation {
    pub confirms: String,
    pub user_id: String,
    pub route_number: String,
    pub location: String,
    pub severity: Severity,
    pub description: String,
    pub disruption: DisruptionKind,
}

/// Listing filters and pagination
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub route: Option<String>,
    pub severity: Option<Severity>,
    pub disruption_type: Option<DisruptionKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Default page size when the caller does not pass a limit
pub const DEFAULT_LIST_LIMIT: i64 = 50;

impl ReportFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

/// Store health probe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    /// Table present and queryable
    Ready { total_records: u64 },
    /// The store works but the reports table is missing (setup required)
    TableNotFound,
}

/// A stored row with every domain column optional.
///
/// Listing tolerates partial schema drift: a row that lost a column is
/// defaulted rather than failing the whole page. The defaults are fixed
/// here, not scattered per call site.
#[derive(Debug, Clone, Default)]
pub struct RawReport {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub route_number: Option<String>,
    pub location: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub disruption: Option<String>,
    pub user_id: Option<String>,
    pub inspector: Option<bool>,
    pub confirms: Option<String>,
}

impl RawReport {
    /// Apply the documented defaults:
    /// id "unknown", route "Unknown", location "Unknown location",
    /// severity low, description "No description", kind other,
    /// user "anonymous", inspector false, created_at now.
    pub fn into_report(self) -> DisruptionReport {
        DisruptionReport {
            id: self.id.unwrap_or_else(|| "unknown".to_string()),
            created_at: self.created_at.unwrap_or_else(Utc::now),
            route_number: self.route_number.unwrap_or_else(|| "Unknown".to_string()),
            location: self
                .location
                .unwrap_or_else(|| "Unknown location".to_string()),
            severity: self
                .severity
                .as_deref()
                .and_then(|s| Severity::parse(s).ok())
                .unwrap_or(Severity::Low),
            description: self
                .description
                .unwrap_or_else(|| "No description".to_string()),
            disruption: self
                .disruption
                .as_deref()
                .and_then(|s| DisruptionKind::parse(s).ok())
                .unwrap_or(DisruptionKind::Other),
            user_id: self.user_id.unwrap_or_else(|| "anonymous".to_string()),
            inspector: self.inspector.unwrap_or(false),
            confirms: self.confirms,
        }
    }
}

/// Unique session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// A signed-in session: the per-request identity context
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user: AuthUser,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}
