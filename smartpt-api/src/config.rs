//! Service configuration

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Mapping-provider API key (directions + geocoding)
    pub maps_api_key: Option<String>,

    /// Generative-language API key
    pub gemini_api_key: Option<String>,

    /// Generative-language model name
    pub gemini_model: String,

    /// External auth provider base URL
    pub auth_url: Option<String>,

    /// External auth provider public (anon) key
    pub auth_key: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            maps_api_key: env::var("GOOGLE_MAPS_API_KEY").ok(),
            gemini_api_key: env::var("GOOGLE_GEMINI_API_KEY").ok(),
            gemini_model: env::var("GOOGLE_GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            auth_url: env::var("AUTH_PROVIDER_URL").ok(),
            auth_key: env::var("AUTH_PROVIDER_KEY").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: "smartpt.db".to_string(),
            maps_api_key: None,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            auth_url: None,
            auth_key: None,
        }
    }
}
