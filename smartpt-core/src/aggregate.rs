//! Grouped view of raw disruption reports
//!
//! Raw reports (first reports and confirmation rows alike) are grouped by
//! (route_number, location). Within a group severity only escalates and the
//! description is only replaced by a strictly longer one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::disruption::{merge_severity, DisruptionKind, DisruptionReport, Severity};

/// One route/location group with its running confirmation tally
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedDisruption {
    pub route_number: String,
    pub location: String,
    pub severity: Severity,
    pub description: String,
    pub disruption: DisruptionKind,
    pub confirmations: u32,
    pub inspector: bool,
    pub latest_at: DateTime<Utc>,
}

/// Collapse raw reports into per-(route, location) groups.
///
/// Groups come back in first-seen order, so feeding reports newest-first
/// yields groups ordered by their most recent activity.
pub fn aggregate(reports: &[DisruptionReport]) -> Vec<AggregatedDisruption> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), AggregatedDisruption> = HashMap::new();

    for report in reports {
        let key = (report.route_number.clone(), report.location.clone());
        match groups.get_mut(&key) {
            Some(group) => {
                group.severity = merge_severity(group.severity, report.severity);
                if report.description.len() > group.description.len() {
                    group.description = report.description.clone();
                }
                group.confirmations += 1;
                group.inspector = group.inspector || report.inspector;
                if report.created_at > group.latest_at {
                    group.latest_at = report.created_at;
                }
            }
            None => {
                order.push(key.clone());
                groups.insert(
                    key,
                    AggregatedDisruption {
                        route_number: report.route_number.clone(),
                        location: report.location.clone(),
                        severity: report.severity,
                        description: report.description.clone(),
                        disruption: report.disruption,
                        confirmations: 1,
                        inspector: report.inspector,
                        latest_at: report.created_at,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}
