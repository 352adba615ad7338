//! Admin authentication.
//!
//! Admin mutations are gated by a shared PIN. A caller can either send the
//! PIN with every request (`{"pin": "..."}` in the body) or exchange it once
//! for a short-lived session token at `POST /api/admin/session` and send
//! `Authorization: Bearer <token>` afterwards.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::crypto::constant_time_eq;
use crate::error::{ApiError, MISSING_FIELDS};
use crate::state::AppState;

/// Audience claim of admin session tokens.
const SESSION_AUDIENCE: &str = "raffle-admin";

/// Subject claim of admin session tokens.
const SESSION_SUBJECT: &str = "admin";

/// Longest accepted session lifetime (30 days).
pub const MAX_SESSION_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Always `"admin"`.
    pub sub: String,
    /// Always `"raffle-admin"`.
    pub aud: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Session identifier, for logging.
    pub jti: String,
}

/// A freshly issued session token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    /// The bearer token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Signing and verification keys for admin sessions (HS256).
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl SessionKeys {
    /// Build keys from the configured secret and lifetime.
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let ttl_seconds = i64::try_from(ttl_seconds.min(MAX_SESSION_TTL_SECONDS)).unwrap_or(0);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::seconds(ttl_seconds),
        }
    }

    /// Issue a new admin session token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if signing fails.
    pub fn issue(&self) -> Result<IssuedSession, ApiError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::Internal("session expiry out of range".into()))?;
        let claims = SessionClaims {
            sub: SESSION_SUBJECT.to_string(),
            aud: SESSION_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign session: {e}")))?;

        tracing::info!(session = %claims.jti, expires_at = %expires_at, "Admin session issued");

        Ok(IssuedSession { token, expires_at })
    }

    /// Verify a session token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is malformed, forged or
    /// expired.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);
        validation.sub = Some(SESSION_SUBJECT.to_string());
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Admin session rejected");
                ApiError::Unauthorized
            })
    }
}

/// Check a PIN against the configured one.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the PIN does not match or no PIN is
/// configured.
pub fn verify_pin(config: &ServiceConfig, pin: &str) -> Result<(), ApiError> {
    let Some(expected) = config.admin_pin.as_deref() else {
        tracing::warn!("Admin call rejected: ADMIN_PIN is not configured");
        return Err(ApiError::Unauthorized);
    };

    if constant_time_eq(pin, expected) {
        Ok(())
    } else {
        tracing::warn!("Admin call rejected: wrong PIN");
        Err(ApiError::Unauthorized)
    }
}

/// Optional bearer session from the `Authorization` header.
///
/// Absent header yields `None`. A present header is verified here but the
/// outcome is only enforced by [`authorize`], so a body PIN still wins over
/// a stale token.
#[derive(Debug)]
pub struct BearerSession(pub Option<Result<SessionClaims, ApiError>>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for BearerSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get("authorization") else {
            return Ok(Self(None));
        };

        let claims = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)
            .and_then(|token| state.sessions.verify(token.trim()));

        Ok(Self(Some(claims)))
    }
}

/// How an admin request was authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuth {
    /// The request carried the PIN.
    Pin,
    /// The request carried a session token.
    Session {
        /// Session identifier.
        id: String,
    },
}

/// Authorize an admin request from a body PIN or a bearer session.
///
/// A non-empty PIN takes precedence over the session, and the session is
/// only checked when no PIN was sent.
///
/// # Errors
///
/// - `ApiError::BadRequest` if neither is present.
/// - `ApiError::Unauthorized` if the PIN is wrong, or if there is no PIN and
///   the token is invalid or expired.
pub fn authorize(
    state: &AppState,
    session: &BearerSession,
    pin: Option<&str>,
) -> Result<AdminAuth, ApiError> {
    match (pin.filter(|p| !p.is_empty()), &session.0) {
        (Some(pin), _) => verify_pin(&state.config, pin).map(|()| AdminAuth::Pin),
        (None, Some(Ok(claims))) => Ok(AdminAuth::Session {
            id: claims.jti.clone(),
        }),
        (None, Some(Err(_))) => Err(ApiError::Unauthorized),
        (None, None) => Err(ApiError::BadRequest(MISSING_FIELDS.into())),
    }
}
