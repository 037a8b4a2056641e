//! In-memory storage implementations

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use smartpt_core::disruption::DUPLICATE_WINDOW_HOURS;
use smartpt_core::DisruptionReport;
use uuid::Uuid;

use super::{
    NewConfirmation, NewDisruptionReport, ReportFilter, Session, SessionId, StoreResult,
    StoreStatus,
};
use crate::auth::AuthUser;
use crate::error::ApiError;

/// In-memory disruption store
pub struct InMemoryDisruptionStore {
    reports: RwLock<Vec<DisruptionReport>>,
}

impl InMemoryDisruptionStore {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(Vec::new()),
        }
    }

    /// Backdate a report (for testing purposes)
    pub fn set_created_at(&self, id: &str, created_at: DateTime<Utc>) -> StoreResult<()> {
        let mut reports = self.reports.write().unwrap();
        if let Some(report) = reports.iter_mut().find(|r| r.id == id) {
            report.created_at = created_at;
            Ok(())
        } else {
            Err(ApiError::DisruptionNotFound)
        }
    }
}

impl Default for InMemoryDisruptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl super::DisruptionStore for InMemoryDisruptionStore {
    fn insert(&self, new: NewDisruptionReport) -> StoreResult<DisruptionReport> {
        // Duplicate-window check and insert happen under one write lock
        let mut reports = self.reports.write().unwrap();

        let cutoff = Utc::now() - Duration::hours(DUPLICATE_WINDOW_HOURS);
        let duplicate = reports.iter().any(|r| {
            r.route_number == new.route_number
                && r.location == new.location
                && r.created_at >= cutoff
        });
        if duplicate {
            return Err(ApiError::DuplicateReport);
        }

        let report = DisruptionReport {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            route_number: new.route_number,
            location: new.location,
            severity: new.severity,
            description: new.description,
            disruption: new.disruption,
            user_id: new.user_id,
            inspector: new.inspector,
            confirms: None,
        };
        reports.push(report.clone());
        Ok(report)
    }

    fn insert_confirmation(&self, new: NewConfirmation) -> StoreResult<DisruptionReport> {
        let mut reports = self.reports.write().unwrap();

        if !reports.iter().any(|r| r.id == new.confirms) {
            return Err(ApiError::DisruptionNotFound);
        }

        // The original reporter and prior confirmers both count
        let already = reports.iter().any(|r| {
            r.user_id == new.user_id
                && (r.id == new.confirms || r.confirms.as_deref() == Some(new.confirms.as_str()))
        });
        if already {
            return Err(ApiError::AlreadyConfirmed);
        }

        let report = DisruptionReport {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            route_number: new.route_number,
            location: new.location,
            severity: new.severity,
            description: new.description,
            disruption: new.disruption,
            user_id: new.user_id,
            inspector: false,
            confirms: Some(new.confirms),
        };
        reports.push(report.clone());
        Ok(report)
    }

    fn get(&self, id: &str) -> StoreResult<Option<DisruptionReport>> {
        let reports = self.reports.read().unwrap();
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    fn list(&self, filter: &ReportFilter) -> StoreResult<Vec<DisruptionReport>> {
        let reports = self.reports.read().unwrap();

        let mut matched: Vec<DisruptionReport> = reports
            .iter()
            .filter(|r| {
                filter.route.as_deref().map_or(true, |v| r.route_number == v)
                    && filter.severity.map_or(true, |v| r.severity == v)
                    && filter
                        .disruption_type
                        .map_or(true, |v| r.disruption == v)
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset().max(0) as usize;
        let limit = filter.limit().max(0) as usize;
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut reports = self.reports.write().unwrap();
        let before = reports.len();
        reports.retain(|r| r.id != id);
        Ok(reports.len() < before)
    }

    fn status(&self) -> StoreResult<StoreStatus> {
        let reports = self.reports.read().unwrap();
        Ok(StoreStatus::Ready {
            total_records: reports.len() as u64,
        })
    }
}

// Implement the trait for Arc<InMemoryDisruptionStore> so tests can keep a
// handle to the store they hand to the router
impl super::DisruptionStore for std::sync::Arc<InMemoryDisruptionStore> {
    fn insert(&self, new: NewDisruptionReport) -> StoreResult<DisruptionReport> {
        (**self).insert(new)
    }

    fn insert_confirmation(&self, new: NewConfirmation) -> StoreResult<DisruptionReport> {
        (**self).insert_confirmation(new)
    }

    fn get(&self, id: &str) -> StoreResult<Option<DisruptionReport>> {
        (**self).get(id)
    }

    fn list(&self, filter: &ReportFilter) -> StoreResult<Vec<DisruptionReport>> {
        (**self).list(filter)
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        (**self).delete(id)
    }

    fn status(&self) -> StoreResult<StoreStatus> {
        (**self).status()
    }
}

/// In-memory session store
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl super::SessionStore for InMemorySessionStore {
    fn create(&self, user: AuthUser, access_token: &str) -> StoreResult<Session> {
        let session = Session {
            id: SessionId(Uuid::new_v4().to_string()),
            user,
            access_token: access_token.to_string(),
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().unwrap().get(session_id).cloned())
    }

    fn update_user(&self, session_id: &SessionId, user: AuthUser) -> StoreResult<()> {
        let mut sessions = self.sessions.write().unwrap();
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.user = user;
                Ok(())
            }
            None => Err(ApiError::NotAuthenticated),
        }
    }

    fn delete(&self, session_id: &SessionId) -> StoreResult<()> {
        self.sessions.write().unwrap().remove(session_id);
        Ok(())
    }
}
