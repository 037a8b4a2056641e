//! External auth provider facade
//!
//! Sign-up, sign-in, sign-out and user lookup all delegate to the hosted
//! auth provider; its error messages are surfaced verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::ApiError;

/// Identity owned by the external provider; we hold only this reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// A provider-issued session: the user plus the token to re-fetch it
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
}

/// Trait for the external auth provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ApiError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError>;

    /// Re-fetch the current user for an access token
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ApiError>;
}

/// HTTP client for a GoTrue-style auth provider
pub struct HttpAuthProvider {
    client: reqwest::Client,
    base_url: Option<String>,
    anon_key: Option<String>,
}

impl HttpAuthProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.auth_url.clone(),
            anon_key: config.auth_key.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), ApiError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(ApiError::MissingCredential("AUTH_PROVIDER_URL"))?;
        let anon_key = self
            .anon_key
            .as_deref()
            .ok_or(ApiError::MissingCredential("AUTH_PROVIDER_KEY"))?;
        Ok((base_url, anon_key))
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(ApiError::Auth {
                status: status.as_u16(),
                message: provider_message(&body),
            });
        }
        Ok(body)
    }
}

/// Best-effort extraction of the provider's human-readable error message
fn provider_message(body: &Value) -> String {
    for key in ["msg", "message", "error_description", "error"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return message.to_string();
        }
    }
    "Auth provider error".to_string()
}

fn user_from_value(value: &Value) -> Result<AuthUser, ApiError> {
    // Some endpoints return the user at the top level, some nest it
    let user = value.get("user").unwrap_or(value);
    let id = user.get("id").and_then(Value::as_str);
    let email = user.get("email").and_then(Value::as_str);
    match (id, email) {
        (Some(id), Some(email)) => Ok(AuthUser {
            id: id.to_string(),
            email: email.to_string(),
        }),
        _ => Err(ApiError::Upstream {
            status: 502,
            message: "Auth provider returned an unexpected user shape".to_string(),
        }),
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Upstream {
        status: 500,
        message: format!("Auth provider unreachable: {}", err),
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let (base_url, anon_key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/signup", base_url))
            .header("apikey", anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::read_json(response).await?;
        user_from_value(&body)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let (base_url, anon_key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=password", base_url))
            .header("apikey", anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::read_json(response).await?;
        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or(ApiError::Upstream {
                status: 502,
                message: "Auth provider returned no access token".to_string(),
            })?
            .to_string();
        let user = user_from_value(&body)?;

        Ok(AuthSession { user, access_token })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        let (base_url, anon_key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", base_url))
            .header("apikey", anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ApiError::Auth {
                status,
                message: provider_message(&body),
            });
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ApiError> {
        let (base_url, anon_key) = self.credentials()?;

        let response = self
            .client
            .get(format!("{}/auth/v1/user", base_url))
            .header("apikey", anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::read_json(response).await?;
        user_from_value(&body)
    }
}
