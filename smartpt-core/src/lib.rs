//! Smart PT Core Library
//!
//! Domain rules for the public-transport companion:
//! - Disruption reports and their escalation semantics
//! - The grouped (aggregated) disruption view
//! - Route-plan models and fastest-first collation

pub mod aggregate;
pub mod disruption;
pub mod error;
pub mod route_plan;

pub use aggregate::{aggregate, AggregatedDisruption};
pub use disruption::{
    merge_description, merge_severity, DisruptionKind, DisruptionReport, Severity,
};
pub use error::Error;
pub use route_plan::{collate_routes, RouteResult};

/// Result type for smartpt-core operations
pub type Result<T> = std::result::Result<T, Error>;
