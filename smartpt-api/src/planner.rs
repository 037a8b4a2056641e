//! Route planner
//!
//! Issues the fixed variant queries concurrently and collates whatever
//! succeeds. One variant failing is logged and skipped, not fatal.

use std::sync::Arc;

use futures::future::join_all;

use smartpt_core::route_plan::{collate_routes, RouteResult, QUERY_VARIANTS};

use crate::directions::{DirectionsProvider, DirectionsQuery};
use crate::error::ApiError;

pub struct RoutePlanner {
    provider: Arc<dyn DirectionsProvider>,
}

impl RoutePlanner {
    pub fn new(provider: Arc<dyn DirectionsProvider>) -> Self {
        Self { provider }
    }

    /// One variant query; the best (first) alternative the provider offers
    pub async fn calculate_route(&self, query: &DirectionsQuery) -> Result<RouteResult, ApiError> {
        let routes = self.provider.fetch_routes(query).await?;
        routes.into_iter().next().ok_or(ApiError::Upstream {
            status: 502,
            message: "Directions API error: ZERO_RESULTS".to_string(),
        })
    }

    /// All variant queries in parallel, deduplicated, fastest first
    pub async fn calculate_routes(
        &self,
        origin: &str,
        destination: &str,
        departure_time: Option<i64>,
    ) -> Vec<RouteResult> {
        let queries: Vec<DirectionsQuery> = QUERY_VARIANTS
            .iter()
            .map(|variant| DirectionsQuery {
                origin: origin.to_string(),
                destination: destination.to_string(),
                departure_time,
                modes: variant.modes.to_vec(),
                routing: variant.routing,
            })
            .collect();

        let results = join_all(queries.iter().map(|q| self.calculate_route(q))).await;

        let mut routes = Vec::new();
        for result in results {
            match result {
                Ok(route) => routes.push(route),
                Err(err) => tracing::warn!("Failed to calculate route variant: {}", err),
            }
        }

        collate_routes(routes)
    }
}
