//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use smartpt_core::disruption::DUPLICATE_WINDOW_HOURS;
use smartpt_core::DisruptionReport;
use uuid::Uuid;

use super::{
    NewConfirmation, NewDisruptionReport, RawReport, ReportFilter, Session, SessionId,
    StoreResult, StoreStatus,
};
use crate::auth::AuthUser;
use crate::error::ApiError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const REPORT_COLUMNS: &str =
    "id, created_at, route_number, location, severity, description, disruption, user_id, inspector, confirms";

/// SQLite-based store implementing both DisruptionStore and SessionStore
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ApiError> {
        let conn = Connection::open(path).map_err(|e| ApiError::Internal(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ApiError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ApiError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ApiError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Disruption reports (append-only; confirmations reference
            -- the corroborated report via confirms)
            CREATE TABLE IF NOT EXISTS disruption_reports (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                route_number TEXT,
                location TEXT,
                severity TEXT,
                description TEXT,
                disruption TEXT,
                user_id TEXT,
                inspector INTEGER NOT NULL DEFAULT 0,
                confirms TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_reports_route_location
                ON disruption_reports(route_number, location, created_at);
            -- One confirmation per (disruption, user)
            CREATE UNIQUE INDEX IF NOT EXISTS idx_confirmation_once
                ON disruption_reports(confirms, user_id)
                WHERE confirms IS NOT NULL;

            -- Sessions
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                email TEXT NOT NULL,
                access_token TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }

    fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<DisruptionReport> {
        // Every domain column is read as optional and defaulted, so one
        // drifted row cannot fail a whole listing
        let created_at: Option<String> = row.get(1)?;
        let raw = RawReport {
            id: row.get(0)?,
            created_at: created_at.and_then(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
            }),
            route_number: row.get(2)?,
            location: row.get(3)?,
            severity: row.get(4)?,
            description: row.get(5)?,
            disruption: row.get(6)?,
            user_id: row.get(7)?,
            inspector: row.get::<_, Option<i64>>(8)?.map(|v| v != 0),
            confirms: row.get(9)?,
        };
        Ok(raw.into_report())
    }
}

impl super::DisruptionStore for SqliteStore {
    fn insert(&self, new: NewDisruptionReport) -> StoreResult<DisruptionReport> {
        let conn = self.conn.lock().unwrap();

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let cutoff = (now - Duration::hours(DUPLICATE_WINDOW_HOURS)).to_rfc3339();

        // Conditional insert: the duplicate-window check is part of the
        // statement, not a separate read followed by a write
        let inserted = conn
            .execute(
                "INSERT INTO disruption_reports
                     (id, created_at, route_number, location, severity, description, disruption, user_id, inspector)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
                 WHERE NOT EXISTS (
                     SELECT 1 FROM disruption_reports
                     WHERE route_number = ?3 AND location = ?4 AND created_at >= ?10
                 )",
                params![
                    id,
                    now.to_rfc3339(),
                    new.route_number,
                    new.location,
                    new.severity.as_str(),
                    new.description,
                    new.disruption.as_str(),
                    new.user_id,
                    new.inspector as i32,
                    cutoff,
                ],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if inserted == 0 {
            return Err(ApiError::DuplicateReport);
        }

        Ok(DisruptionReport {
            id,
            created_at: now,
            route_number: new.route_number,
            location: new.location,
            severity: new.severity,
            description: new.description,
            disruption: new.disruption,
            user_id: new.user_id,
            inspector: new.inspector,
            confirms: None,
        })
    }

    fn insert_confirmation(&self, new: NewConfirmation) -> StoreResult<DisruptionReport> {
        let conn = self.conn.lock().unwrap();

        let original_reporter: Option<Option<String>> = conn
            .query_row(
                "SELECT user_id FROM disruption_reports WHERE id = ?1",
                params![new.confirms],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let original_reporter = match original_reporter {
            Some(user_id) => user_id,
            None => return Err(ApiError::DisruptionNotFound),
        };
        if original_reporter.as_deref() == Some(new.user_id.as_str()) {
            return Err(ApiError::AlreadyConfirmed);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        // The unique index on (confirms, user_id) rejects repeats
        conn.execute(
            "INSERT INTO disruption_reports
                 (id, created_at, route_number, location, severity, description, disruption, user_id, inspector, confirms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
            params![
                id,
                now.to_rfc3339(),
                new.route_number,
                new.location,
                new.severity.as_str(),
                new.description,
                new.disruption.as_str(),
                new.user_id,
                new.confirms,
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    return ApiError::AlreadyConfirmed;
                }
            }
            ApiError::Internal(e.to_string())
        })?;

        Ok(DisruptionReport {
            id,
            created_at: now,
            route_number: new.route_number,
            location: new.location,
            severity: new.severity,
            description: new.description,
            disruption: new.disruption,
            user_id: new.user_id,
            inspector: false,
            confirms: Some(new.confirms),
        })
    }

    fn get(&self, id: &str) -> StoreResult<Option<DisruptionReport>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM disruption_reports WHERE id = ?1"),
            params![id],
            Self::row_to_report,
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn list(&self, filter: &ReportFilter) -> StoreResult<Vec<DisruptionReport>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!("SELECT {REPORT_COLUMNS} FROM disruption_reports");
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(route) = &filter.route {
            clauses.push("route_number = ?");
            values.push(Box::new(route.clone()));
        }
        if let Some(severity) = filter.severity {
            clauses.push("severity = ?");
            values.push(Box::new(severity.as_str()));
        }
        if let Some(kind) = filter.disruption_type {
            clauses.push("disruption = ?");
            values.push(Box::new(kind.as_str()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
        values.push(Box::new(filter.limit()));
        values.push(Box::new(filter.offset()));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(|v| v.as_ref()).collect();

        let reports = stmt
            .query_map(&param_refs[..], Self::row_to_report)
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(reports)
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute("DELETE FROM disruption_reports WHERE id = ?1", params![id])
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(rows_affected > 0)
    }

    fn status(&self) -> StoreResult<StoreStatus> {
        let conn = self.conn.lock().unwrap();

        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='disruption_reports')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if !table_exists {
            return Ok(StoreStatus::TableNotFound);
        }

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM disruption_reports", [], |row| {
                row.get(0)
            })
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(StoreStatus::Ready {
            total_records: total as u64,
        })
    }
}

impl super::SessionStore for SqliteStore {
    fn create(&self, user: AuthUser, access_token: &str) -> StoreResult<Session> {
        let conn = self.conn.lock().unwrap();
        let session = Session {
            id: SessionId(Uuid::new_v4().to_string()),
            user,
            access_token: access_token.to_string(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO sessions (id, user_id, email, access_token, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.id.0,
                session.user.id,
                session.user.email,
                session.access_token,
                session.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(session)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, user_id, email, access_token, created_at FROM sessions WHERE id = ?1",
            params![session_id.0],
            |row| {
                let id: String = row.get(0)?;
                let user_id: String = row.get(1)?;
                let email: String = row.get(2)?;
                let access_token: String = row.get(3)?;
                let created_at: String = row.get(4)?;
                Ok(Session {
                    id: SessionId(id),
                    user: AuthUser {
                        id: user_id,
                        email,
                    },
                    access_token,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            },
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn update_user(&self, session_id: &SessionId, user: AuthUser) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "UPDATE sessions SET user_id = ?1, email = ?2 WHERE id = ?3",
                params![user.id, user.email, session_id.0],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            return Err(ApiError::NotAuthenticated);
        }

        Ok(())
    }

    fn delete(&self, session_id: &SessionId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id.0])
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }
}

// Implement the traits for Arc<SqliteStore> so one store can serve as
// both the disruption store and the session store
impl super::DisruptionStore for std::sync::Arc<SqliteStore> {
    fn insert(&self, new: NewDisruptionReport) -> StoreResult<DisruptionReport> {
        (**self).insert(new)
    }

    fn insert_confirmation(&self, new: NewConfirmation) -> StoreResult<DisruptionReport> {
        (**self).insert_confirmation(new)
    }

    fn get(&self, id: &str) -> StoreResult<Option<DisruptionReport>> {
        super::DisruptionStore::get(&**self, id)
    }

    fn list(&self, filter: &ReportFilter) -> StoreResult<Vec<DisruptionReport>> {
        (**self).list(filter)
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        super::DisruptionStore::delete(&**self, id)
    }

    fn status(&self) -> StoreResult<StoreStatus> {
        (**self).status()
    }
}

impl super::SessionStore for std::sync::Arc<SqliteStore> {
    fn create(&self, user: AuthUser, access_token: &str) -> StoreResult<Session> {
        (**self).create(user, access_token)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        super::SessionStore::get(&**self, session_id)
    }

    fn update_user(&self, session_id: &SessionId, user: AuthUser) -> StoreResult<()> {
        (**self).update_user(session_id, user)
    }

    fn delete(&self, session_id: &SessionId) -> StoreResult<()> {
        super::SessionStore::delete(&**self, session_id)
    }
}
