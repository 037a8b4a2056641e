//! Storage abstractions for the gateway

pub mod models;

mod memory;
mod sqlite;

pub use memory::{InMemoryDisruptionStore, InMemorySessionStore};
pub use models::*;
pub use sqlite::SqliteStore;

use smartpt_core::DisruptionReport;

use crate::error::ApiError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ApiError>;

/// Trait for disruption report storage
///
/// Reports are append-only; confirmations are inserted as new rows that
/// reference the report they corroborate. Conflict rules (duplicate window,
/// repeat confirmation) are enforced here, inside the store, so two
/// concurrent requests cannot both pass an application-level check.
pub trait DisruptionStore: Send + Sync {
    /// Insert a new report, rejecting it when another report for the same
    /// route and location exists within the duplicate window
    fn insert(&self, new: NewDisruptionReport) -> StoreResult<DisruptionReport>;

    /// Insert a confirmation row, rejecting a repeat confirmation by the
    /// same user of the same disruption
    fn insert_confirmation(&self, new: NewConfirmation) -> StoreResult<DisruptionReport>;

    /// Get a report by id
    fn get(&self, id: &str) -> StoreResult<Option<DisruptionReport>>;

    /// List reports newest-first with optional filters and pagination
    fn list(&self, filter: &ReportFilter) -> StoreResult<Vec<DisruptionReport>>;

    /// Delete a report; returns whether anything was deleted
    fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Health probe distinguishing a missing table from a broken store
    fn status(&self) -> StoreResult<StoreStatus>;
}

/// Trait for session storage
///
/// A session row is the per-request identity context: the provider user
/// plus the access token needed to re-fetch it.
pub trait SessionStore: Send + Sync {
    /// Create a new session for a signed-in user
    fn create(&self, user: crate::auth::AuthUser, access_token: &str) -> StoreResult<Session>;

    /// Get a session by id
    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>>;

    /// Replace the cached user on a session (explicit refresh)
    fn update_user(&self, session_id: &SessionId, user: crate::auth::AuthUser) -> StoreResult<()>;

    /// Delete a session
    fn delete(&self, session_id: &SessionId) -> StoreResult<()>;
}
