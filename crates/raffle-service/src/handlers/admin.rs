//! Admin handlers: sessions, payment confirmation, releasing and reset.
//!
//! Every mutation is authorized with [`auth::authorize`] before the store is
//! touched.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use raffle_core::SlotNumber;

use crate::auth::{self, BearerSession, IssuedSession};
use crate::error::{ApiError, ApiJson, MISSING_FIELDS};
use crate::handlers::OkResponse;
use crate::state::AppState;

/// Request carrying only the PIN.
#[derive(Debug, Deserialize)]
pub struct PinRequest {
    /// Admin PIN. Optional when a bearer session is sent.
    pub pin: Option<String>,
}

/// Request naming a slot.
#[derive(Debug, Deserialize)]
pub struct SlotRequest {
    /// Target slot.
    pub slot: Option<i64>,
    /// Admin PIN. Optional when a bearer session is sent.
    pub pin: Option<String>,
}

/// Response for operations that may remove rows.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    /// Always `true`.
    pub ok: bool,
    /// Number of entries removed.
    pub removed: u64,
}

/// Exchange the PIN for a session token.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<PinRequest>,
) -> Result<Json<IssuedSession>, ApiError> {
    let pin = body
        .pin
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.into()))?;

    auth::verify_pin(&state.config, &pin)?;
    Ok(Json(state.sessions.issue()?))
}

/// Mark a slot as paid.
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    session: BearerSession,
    ApiJson(body): ApiJson<SlotRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let slot = required_slot(body.slot)?;
    let admin = auth::authorize(&state, &session, body.pin.as_deref())?;
    let slot = SlotNumber::new(slot)?;

    let entry = state.store.confirm_payment(slot).await?;
    tracing::info!(slot = %slot, paid_at = ?entry.paid_at, admin = ?admin, "Payment confirmed");

    Ok(Json(OkResponse::new()))
}

/// Release a slot. Releasing a free slot succeeds with `removed: 0`.
pub async fn unreserve(
    State(state): State<Arc<AppState>>,
    session: BearerSession,
    ApiJson(body): ApiJson<SlotRequest>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let slot = required_slot(body.slot)?;
    let admin = auth::authorize(&state, &session, body.pin.as_deref())?;
    let slot = SlotNumber::new(slot)?;

    let removed = state.store.unreserve(slot).await?;
    tracing::info!(slot = %slot, removed, admin = ?admin, "Slot released");

    Ok(Json(RemovedResponse {
        ok: true,
        removed: u64::from(removed),
    }))
}

/// Remove every entry.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    session: BearerSession,
    ApiJson(body): ApiJson<PinRequest>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let admin = auth::authorize(&state, &session, body.pin.as_deref())?;

    let removed = state.store.reset().await?;
    tracing::warn!(removed, admin = ?admin, "Raffle reset");

    Ok(Json(RemovedResponse { ok: true, removed }))
}

fn required_slot(slot: Option<i64>) -> Result<i64, ApiError> {
    slot.ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.into()))
}
