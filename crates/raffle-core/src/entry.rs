//! Raffle entries.
//!
//! An entry ties a slot to a buyer and tracks whether the buyer has paid.
//! Entries are created as [`EntryStatus::Reserved`] and only ever move to
//! [`EntryStatus::Paid`]; removing an entry is the only way back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RaffleError;
use crate::SlotNumber;

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// The slot is held for the buyer, payment not yet confirmed.
    Reserved,
    /// Payment confirmed by the admin.
    Paid,
}

impl EntryStatus {
    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = RaffleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserved" => Ok(Self::Reserved),
            "paid" => Ok(Self::Paid),
            other => Err(RaffleError::InvalidStatus(other.to_string())),
        }
    }
}

/// A reserved or paid slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleEntry {
    /// The slot this entry holds.
    pub slot: SlotNumber,

    /// Full name of the buyer as submitted.
    pub buyer_name: String,

    /// Contact phone, free-form.
    pub phone: String,

    /// Current status.
    pub status: EntryStatus,

    /// When the slot was reserved.
    pub reserved_at: DateTime<Utc>,

    /// When payment was confirmed. Present iff `status` is `Paid`.
    pub paid_at: Option<DateTime<Utc>>,
}

impl RaffleEntry {
    /// Create a freshly reserved entry.
    #[must_use]
    pub fn reserved(reservation: &NewReservation, reserved_at: DateTime<Utc>) -> Self {
        Self {
            slot: reservation.slot,
            buyer_name: reservation.buyer_name.clone(),
            phone: reservation.phone.clone(),
            status: EntryStatus::Reserved,
            reserved_at,
            paid_at: None,
        }
    }

    /// Whether payment has been confirmed.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == EntryStatus::Paid
    }

    /// Mark the entry paid.
    ///
    /// Returns `false` and leaves the entry untouched if it was already paid,
    /// so the first `paid_at` is kept.
    pub fn mark_paid(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_paid() {
            return false;
        }
        self.status = EntryStatus::Paid;
        self.paid_at = Some(at);
        true
    }

    /// Case-insensitive comparison against a buyer's full name.
    #[must_use]
    pub fn has_buyer_name(&self, full_name: &str) -> bool {
        self.buyer_name.to_lowercase() == full_name.trim().to_lowercase()
    }
}

/// A validated request to reserve one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    /// Slot to reserve.
    pub slot: SlotNumber,
    /// Buyer's full name, trimmed and non-empty.
    pub buyer_name: String,
    /// Buyer's phone, trimmed and non-empty.
    pub phone: String,
}

impl NewReservation {
    /// Validate the buyer fields for a slot.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::MissingField` if the name or phone is blank.
    pub fn new(slot: SlotNumber, buyer_name: &str, phone: &str) -> Result<Self, RaffleError> {
        Ok(Self {
            slot,
            buyer_name: required("buyer_name", buyer_name)?,
            phone: required("phone", phone)?,
        })
    }

    /// Build one reservation per slot for the same buyer.
    ///
    /// Slots are deduplicated and sorted so a batch touches each slot once.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::MissingField` if the buyer fields are blank or
    /// no slot was given.
    pub fn batch(
        slots: &[SlotNumber],
        buyer_name: &str,
        phone: &str,
    ) -> Result<Vec<Self>, RaffleError> {
        if slots.is_empty() {
            return Err(RaffleError::MissingField("slots"));
        }
        let buyer_name = required("buyer_name", buyer_name)?;
        let phone = required("phone", phone)?;

        let mut slots = slots.to_vec();
        slots.sort_unstable();
        slots.dedup();

        Ok(slots
            .into_iter()
            .map(|slot| Self {
                slot,
                buyer_name: buyer_name.clone(),
                phone: phone.clone(),
            })
            .collect())
    }
}

/// Join first and last name the way buyers are stored.
#[must_use]
pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim())
}

fn required(field: &'static str, value: &str) -> Result<String, RaffleError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RaffleError::MissingField(field));
    }
    Ok(value.to_string())
}
