//! Request and response types for the raffle client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use raffle_core::SlotNumber;

/// Single slot reservation request.
#[derive(Debug, Clone, Serialize)]
pub struct ReserveRequest {
    /// Slot to reserve.
    pub slot: SlotNumber,
    /// Buyer's full name.
    pub buyer_name: String,
    /// Buyer's phone.
    pub phone: String,
}

/// Batch reservation request.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReserveRequest {
    /// Slots to reserve together.
    pub slots: Vec<SlotNumber>,
    /// Buyer's full name.
    pub buyer_name: String,
    /// Buyer's phone.
    pub phone: String,
}

/// Batch reservation response.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchReserveResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// Slots reserved, ascending.
    pub reserved: Vec<SlotNumber>,
}

/// Plain success response.
#[derive(Debug, Clone, Deserialize)]
pub struct OkResponse {
    /// Always `true` on success.
    pub ok: bool,
}

/// Response for operations that remove entries.
#[derive(Debug, Clone, Deserialize)]
pub struct RemovedResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// Number of entries removed.
    pub removed: u64,
}

/// Raffle facts and payment instructions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RaffleInfo {
    /// Number of slots.
    pub slot_count: u8,
    /// Price per slot in cents.
    pub ticket_price_cents: i64,
    /// Currency symbol.
    pub currency: String,
    /// PIX key.
    pub pix_key: String,
    /// PIX account holder.
    pub pix_holder: String,
    /// Bank.
    pub pix_bank: String,
}

/// Admin session issued for a correct PIN.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSession {
    /// Bearer token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Check whether the session is still usable.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Credentials for an admin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCredential {
    /// Send the PIN in the request body.
    Pin(String),
    /// Send a session token as a bearer header.
    Session(String),
}

/// Admin request body naming a slot.
#[derive(Debug, Serialize)]
pub(crate) struct AdminSlotRequest<'a> {
    pub slot: SlotNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<&'a str>,
}

/// Admin request body with only credentials.
#[derive(Debug, Serialize)]
pub(crate) struct AdminPinRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<&'a str>,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: String,
    #[serde(default)]
    pub code: Option<String>,
}
