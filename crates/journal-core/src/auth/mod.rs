//! Journal API auth client and request context.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::normalize_api_base_url;
use crate::error::{Error, Result};
use crate::util::unix_timestamp_now;

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// Signed-in session as returned by the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

impl AuthSession {
    /// Expiry (Unix seconds) read from the token's `exp` claim, if present.
    pub fn expires_at(&self) -> Option<i64> {
        let payload = self.token.split('.').nth(1)?;
        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims = serde_json::from_slice::<TokenClaims>(&decoded).ok()?;
        claims.exp
    }

    /// Tokens without an `exp` claim are treated as long-lived.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .is_some_and(|expires_at| expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS)
    }

    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.token.clone(), self.user.clone())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Authenticated identity passed explicitly to every store/service call.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    access_token: String,
    user: AuthUser,
}

impl RequestContext {
    pub fn new(access_token: impl Into<String>, user: AuthUser) -> Self {
        Self {
            access_token: access_token.into(),
            user,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub const fn user(&self) -> &AuthUser {
        &self.user
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RequestContext")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> Result<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct AuthClient<S: SessionPersistence> {
    api_url: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> AuthClient<S> {
    pub fn new(url: impl AsRef<str>, store: S) -> Result<Self> {
        let api_url = normalize_api_base_url(url.as_ref())?;
        Ok(Self {
            api_url,
            client: Client::builder().build()?,
            store,
        })
    }

    /// Load the persisted session, dropping it once the token has expired.
    pub fn restore_session(&self) -> Result<Option<AuthSession>> {
        let Some(stored_session) = self.store.load_session()? else {
            return Ok(None);
        };

        if stored_session.is_expired() {
            tracing::warn!(
                "Stored session for {} has expired; sign in again",
                stored_session.user.username
            );
            self.store.clear_session()?;
            return Ok(None);
        }

        Ok(Some(stored_session))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        validate_credentials(username, password)?;

        let payload = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self
            .client
            .post(format!("{}/api/login", self.api_url))
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_auth_failure(status, &body));
        }

        let session = response.json::<LoginResponse>().await?.into_session(username)?;
        self.store.save_session(&session)?;
        tracing::info!("Signed in as {}", session.user.username);
        Ok(session)
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthSession> {
        validate_credentials(username, password)?;

        let payload = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self
            .client
            .post(format!("{}/api/register", self.api_url))
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Service(parse_api_error(status, &body)));
        }

        self.login(username, password).await
    }

    /// Sessions are stateless bearer tokens; logging out only forgets the token.
    pub fn logout(&self) -> Result<()> {
        self.store.clear_session()
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::Validation("Username is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(Error::Validation("Password is required".to_string()));
    }
    Ok(())
}

fn map_auth_failure(status: StatusCode, body: &str) -> Error {
    let message = parse_api_error(status, body);
    if status == StatusCode::UNAUTHORIZED {
        Error::Unauthenticated(message)
    } else {
        Error::Service(message)
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    username: Option<String>,
    user_id: Option<serde_json::Value>,
}

impl LoginResponse {
    fn into_session(self, requested_username: &str) -> Result<AuthSession> {
        let token = self
            .token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Service("Login response did not include a token".to_string()))?;
        let id = match self.user_id {
            Some(serde_json::Value::String(id)) => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => {
                return Err(Error::Service(
                    "Login response did not include a user id".to_string(),
                ))
            }
        };
        let username = self
            .username
            .unwrap_or_else(|| requested_username.trim().to_string());

        Ok(AuthSession {
            token,
            user: AuthUser { id, username },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

/// Render a backend error body as `message (status)`.
pub(crate) fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", crate::util::compact_text(trimmed), status.as_u16())
    }
}
