//! Public raffle handlers: listing, reservations and payment info.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use raffle_core::{
    NewReservation, RaffleEntry, SlotNumber, CURRENCY_SYMBOL, SLOT_COUNT, TICKET_PRICE_CENTS,
};

use crate::error::{ApiError, ApiJson, MISSING_FIELDS};
use crate::handlers::OkResponse;
use crate::state::AppState;

/// Reserve one slot.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Slot to reserve.
    pub slot: Option<i64>,
    /// Buyer's full name.
    pub buyer_name: Option<String>,
    /// Buyer's phone.
    pub phone: Option<String>,
}

/// Reserve several slots at once.
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    /// Slots to reserve.
    pub slots: Option<Vec<i64>>,
    /// Buyer's full name.
    pub buyer_name: Option<String>,
    /// Buyer's phone.
    pub phone: Option<String>,
}

/// Batch reservation response.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Always `true`.
    pub ok: bool,
    /// Slots reserved, ascending.
    pub reserved: Vec<SlotNumber>,
}

/// Raffle facts and payment instructions.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Number of slots.
    pub slot_count: u8,
    /// Price per slot in cents.
    pub ticket_price_cents: i64,
    /// Currency symbol.
    pub currency: &'static str,
    /// PIX key.
    pub pix_key: String,
    /// PIX account holder.
    pub pix_holder: String,
    /// Bank.
    pub pix_bank: String,
}

/// List every entry ordered by slot.
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RaffleEntry>>, ApiError> {
    Ok(Json(state.store.list_entries().await?))
}

/// Reserve a single slot.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateEntryRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let (Some(slot), Some(buyer_name), Some(phone)) = (body.slot, body.buyer_name, body.phone)
    else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.into()));
    };

    let reservation = NewReservation::new(SlotNumber::new(slot)?, &buyer_name, &phone)?;

    match state.store.reserve(&reservation).await {
        Ok(entry) => {
            tracing::info!(slot = %entry.slot, buyer = %entry.buyer_name, "Slot reserved");
            Ok(Json(OkResponse::new()))
        }
        Err(e) => {
            tracing::warn!(slot = %reservation.slot, error = %e, "Reservation failed");
            Err(e.into())
        }
    }
}

/// Reserve several slots in one all-or-nothing operation.
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let (Some(slots), Some(buyer_name), Some(phone)) = (body.slots, body.buyer_name, body.phone)
    else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.into()));
    };

    let slots = slots
        .into_iter()
        .map(SlotNumber::new)
        .collect::<Result<Vec<_>, _>>()?;
    let reservations = NewReservation::batch(&slots, &buyer_name, &phone)?;

    match state.store.reserve_batch(&reservations).await {
        Ok(entries) => {
            let reserved: Vec<SlotNumber> = entries.iter().map(|e| e.slot).collect();
            tracing::info!(slots = ?reserved, buyer = %buyer_name.trim(), "Slots reserved");
            Ok(Json(BatchResponse { ok: true, reserved }))
        }
        Err(e) => {
            tracing::warn!(slots = ?slots, error = %e, "Batch reservation failed");
            Err(e.into())
        }
    }
}

/// Raffle facts and static payment instructions.
pub async fn payment_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let payment = &state.config.payment;
    Json(InfoResponse {
        slot_count: SLOT_COUNT,
        ticket_price_cents: TICKET_PRICE_CENTS,
        currency: CURRENCY_SYMBOL,
        pix_key: payment.pix_key.clone(),
        pix_holder: payment.pix_holder.clone(),
        pix_bank: payment.pix_bank.clone(),
    })
}
