//! Error types for Smart PT core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid severity level: {0}")]
    InvalidSeverity(String),

    #[error("Invalid disruption type: {0}")]
    InvalidKind(String),
}
