//! Common test utilities for gateway integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;

use smartpt_api::directions::DirectionsQuery;
use smartpt_api::{
    routes, ApiError, AppState, AuthProvider, AuthSession, AuthUser, DirectionsProvider,
    GeocodeResult, GeocodingProvider, GenerativeModel, InMemoryDisruptionStore,
    InMemorySessionStore, RoutePlanner,
};
use smartpt_core::route_plan::{
    LatLng, RouteResult, RoutingPreference, TextValue, TransitMode, QUERY_VARIANTS,
};

/// Mock auth provider backed by an in-memory user table
pub struct MockAuthProvider {
    users: RwLock<HashMap<String, (String, AuthUser)>>,
    tokens: RwLock<HashMap<String, String>>,
    next_user_id: AtomicU64,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            next_user_id: AtomicU64::new(1),
        }
    }

    /// Change a user's email on the provider side (for refresh tests)
    pub fn rename(&self, email: &str, new_email: &str) {
        let mut users = self.users.write().unwrap();
        if let Some((password, mut user)) = users.remove(email) {
            user.email = new_email.to_string();
            users.insert(new_email.to_string(), (password, user));
        }
        let mut tokens = self.tokens.write().unwrap();
        for value in tokens.values_mut() {
            if value == email {
                *value = new_email.to_string();
            }
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(email) {
            return Err(ApiError::Auth {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let user = AuthUser {
            id: format!("user-{}", self.next_user_id.fetch_add(1, Ordering::SeqCst)),
            email: email.to_string(),
        };
        users.insert(email.to_string(), (password.to_string(), user.clone()));
        Ok(user)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let users = self.users.read().unwrap();
        match users.get(email) {
            Some((stored, user)) if stored == password => {
                let access_token = format!("token-{}", user.id);
                self.tokens
                    .write()
                    .unwrap()
                    .insert(access_token.clone(), email.to_string());
                Ok(AuthSession {
                    user: user.clone(),
                    access_token,
                })
            }
            _ => Err(ApiError::Auth {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        self.tokens.write().unwrap().remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ApiError> {
        let tokens = self.tokens.read().unwrap();
        let email = tokens.get(access_token).ok_or(ApiError::Auth {
            status: 401,
            message: "Invalid token".to_string(),
        })?;
        let users = self.users.read().unwrap();
        users
            .get(email)
            .map(|(_, user)| user.clone())
            .ok_or(ApiError::Auth {
                status: 401,
                message: "Invalid token".to_string(),
            })
    }
}

fn preference_key(modes: &[TransitMode], routing: RoutingPreference) -> String {
    let modes = modes
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("|");
    format!("{}:{}", modes, routing.as_str())
}

/// Mock directions provider with canned responses per variant query
pub struct MockDirectionsProvider {
    responses: RwLock<HashMap<String, Result<Vec<RouteResult>, String>>>,
}

impl MockDirectionsProvider {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
        }
    }

    /// Canned routes for one of the three fixed variants
    pub fn set_routes(&self, variant: usize, routes: Vec<RouteResult>) {
        let pref = &QUERY_VARIANTS[variant];
        self.responses
            .write()
            .unwrap()
            .insert(preference_key(pref.modes, pref.routing), Ok(routes));
    }

    /// Canned provider failure for one of the three fixed variants
    pub fn set_error(&self, variant: usize, message: &str) {
        let pref = &QUERY_VARIANTS[variant];
        self.responses.write().unwrap().insert(
            preference_key(pref.modes, pref.routing),
            Err(message.to_string()),
        );
    }
}

#[async_trait]
impl DirectionsProvider for MockDirectionsProvider {
    async fn fetch_routes(&self, query: &DirectionsQuery) -> Result<Vec<RouteResult>, ApiError> {
        let key = preference_key(&query.modes, query.routing);
        match self.responses.read().unwrap().get(&key) {
            Some(Ok(routes)) => Ok(routes.clone()),
            Some(Err(message)) => Err(ApiError::Upstream {
                status: 502,
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Mock geocoder echoing the query back as a single match
pub struct MockGeocoder;

#[async_trait]
impl GeocodingProvider for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, ApiError> {
        Ok(vec![GeocodeResult {
            place_id: "mock-place".to_string(),
            formatted_address: format!("{}, Victoria, Australia", address),
            name: address.to_string(),
            location: LatLng {
                lat: -37.8136,
                lng: 144.9631,
            },
        }])
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeocodeResult>, ApiError> {
        Ok(vec![GeocodeResult {
            place_id: "mock-place".to_string(),
            formatted_address: format!("{}, {}", lat, lng),
            name: "Reverse match".to_string(),
            location: LatLng { lat, lng },
        }])
    }
}

/// Mock generative model that captures the prompt it was given
pub struct MockGenerativeModel {
    pub reply: RwLock<String>,
    pub error: RwLock<Option<(u16, String)>>,
    pub last_prompt: RwLock<Option<String>>,
}

impl MockGenerativeModel {
    pub fn new() -> Self {
        Self {
            reply: RwLock::new("Catch the 86 from Bourke St.".to_string()),
            error: RwLock::new(None),
            last_prompt: RwLock::new(None),
        }
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        *self.error.write().unwrap() = Some((status, message.to_string()));
    }
}

#[async_trait]
impl GenerativeModel for MockGenerativeModel {
    async fn generate_reply(&self, prompt: &str) -> Result<String, ApiError> {
        *self.last_prompt.write().unwrap() = Some(prompt.to_string());
        if let Some((status, message)) = self.error.read().unwrap().clone() {
            return Err(ApiError::Upstream { status, message });
        }
        Ok(self.reply.read().unwrap().clone())
    }
}

/// Handles to the mocks behind a test server
pub struct TestContext {
    pub disruption_store: Arc<InMemoryDisruptionStore>,
    pub auth: Arc<MockAuthProvider>,
    pub directions: Arc<MockDirectionsProvider>,
    pub model: Arc<MockGenerativeModel>,
}

/// Create a test server with in-memory stores and mock providers
pub fn create_test_server() -> (TestServer, TestContext) {
    let disruption_store = Arc::new(InMemoryDisruptionStore::new());
    let auth = Arc::new(MockAuthProvider::new());
    let directions = Arc::new(MockDirectionsProvider::new());
    let model = Arc::new(MockGenerativeModel::new());

    let state = Arc::new(AppState::new(
        disruption_store.clone(),
        InMemorySessionStore::new(),
        auth.clone() as Arc<dyn AuthProvider>,
        Arc::new(MockGeocoder) as Arc<dyn GeocodingProvider>,
        RoutePlanner::new(directions.clone() as Arc<dyn DirectionsProvider>),
        model.clone() as Arc<dyn GenerativeModel>,
    ));

    let app = routes::create_router(state);
    let mut server = TestServer::new(app).expect("Failed to create test server");
    server.do_save_cookies();

    (
        server,
        TestContext {
            disruption_store,
            auth,
            directions,
            model,
        },
    )
}

/// Create a test server with a caller-supplied generative model
pub fn create_test_server_with_model(model: Arc<dyn GenerativeModel>) -> TestServer {
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryDisruptionStore::new()),
        InMemorySessionStore::new(),
        Arc::new(MockAuthProvider::new()) as Arc<dyn AuthProvider>,
        Arc::new(MockGeocoder) as Arc<dyn GeocodingProvider>,
        RoutePlanner::new(Arc::new(MockDirectionsProvider::new()) as Arc<dyn DirectionsProvider>),
        model,
    ));

    TestServer::new(routes::create_router(state)).expect("Failed to create test server")
}

/// Build a minimal route with the identity fields that matter for collation
pub fn route(summary: &str, duration_secs: i64, distance_m: i64) -> RouteResult {
    RouteResult {
        distance: TextValue {
            text: format!("{:.1} km", distance_m as f64 / 1000.0),
            value: distance_m,
        },
        duration: TextValue {
            text: format!("{} mins", duration_secs / 60),
            value: duration_secs,
        },
        legs: Vec::new(),
        overview_polyline: String::new(),
        summary: summary.to_string(),
        warnings: Vec::new(),
        waypoint_order: Vec::new(),
    }
}

/// Submit a valid disruption report and return its id
pub async fn submit_report(server: &TestServer, route: &str, location: &str, user: &str) -> String {
    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": route,
            "location": location,
            "severity": "low",
            "description": "minor delay",
            "disruption": "delay",
            "user_id": user,
        }))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: serde_json::Value = response.json();
    body["data"]["id"].as_str().expect("No report id").to_string()
}

/// Sign up and sign in a user; the session cookie is saved on the server
pub async fn sign_in(server: &TestServer, email: &str, password: &str) {
    let response = server
        .post("/auth/sign-up")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .post("/auth/sign-in")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200);
}
