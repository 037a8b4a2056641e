//! Smart PT API
//!
//! HTTP gateway for the public-transport companion: disruption reporting,
//! trip planning via the mapping provider, a chat assistant, and account
//! management against the external auth provider.

pub mod auth;
pub mod chat;
pub mod config;
pub mod directions;
pub mod error;
pub mod planner;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{AuthProvider, AuthSession, AuthUser, HttpAuthProvider};
pub use chat::{build_prompt, ChatContext, GeminiClient, GenerativeModel};
pub use config::Config;
pub use directions::{
    DirectionsProvider, DirectionsQuery, GeocodeResult, GeocodingProvider, GoogleMapsClient,
};
pub use error::ApiError;
pub use planner::RoutePlanner;
pub use state::AppState;
pub use store::{
    DisruptionStore, InMemoryDisruptionStore, InMemorySessionStore, SessionStore, SqliteStore,
};
