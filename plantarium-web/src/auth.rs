//! Session authentication
//!
//! Credentials arrive either as a `Bearer` token in the Authorization
//! header or as the identity provider's `__session` cookie. Every
//! verification failure collapses to "unauthenticated": the reason is
//! logged server-side and never reaches the client.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use plantarium_common::{Error, Result};

/// Cookie the identity provider stores the session token in
const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Verifies session credentials against the identity-provider secret
#[derive(Clone)]
pub struct AuthGate {
    secret: Option<String>,
}

impl AuthGate {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Verify the request's credential, if any.
    ///
    /// Returns `Ok(None)` both when no credential is present and when
    /// verification fails. `Err` is reserved for missing server
    /// configuration: a request that carries a credential the server
    /// cannot check is a deployment problem, not an auth failure.
    pub fn verify(&self, headers: &HeaderMap) -> Result<Option<String>> {
        let Some(token) = extract_session_token(headers) else {
            return Ok(None);
        };

        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| Error::Config("PLANTARIUM_SESSION_SECRET is not set".to_string()))?;

        let key = DecodingKey::from_secret(secret.as_bytes());
        match decode::<SessionClaims>(&token, &key, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Ok(Some(data.claims.sub)),
            Err(e) => {
                tracing::warn!(error = %e, "Session token verification failed");
                Ok(None)
            }
        }
    }
}

/// Pull the session token from the Authorization header, falling back
/// to the session cookie.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| cookie_value(raw, SESSION_COOKIE))
}

/// Extract a cookie by name. Pairs split on the first `=` only, so
/// values may themselves contain `=`.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split("; ").find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (!key.is_empty() && key == name).then(|| value.to_string())
    })
}
