//! Application state

use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::chat::GenerativeModel;
use crate::directions::GeocodingProvider;
use crate::planner::RoutePlanner;
use crate::store::{DisruptionStore, SessionStore};

/// Shared state handed to every request handler.
///
/// Identity is not cached process-wide; handlers resolve the session for
/// their own request from the session store.
pub struct AppState<D, S> {
    pub disruption_store: D,
    pub session_store: S,
    pub auth: Arc<dyn AuthProvider>,
    pub geocoder: Arc<dyn GeocodingProvider>,
    pub planner: RoutePlanner,
    pub model: Arc<dyn GenerativeModel>,
}

impl<D, S> AppState<D, S>
where
    D: DisruptionStore,
    S: SessionStore,
{
    pub fn new(
        disruption_store: D,
        session_store: S,
        auth: Arc<dyn AuthProvider>,
        geocoder: Arc<dyn GeocodingProvider>,
        planner: RoutePlanner,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        Self {
            disruption_store,
            session_store,
            auth,
            geocoder,
            planner,
            model,
        }
    }
}
