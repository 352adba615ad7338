//! Change notifications for the entries table.
//!
//! Subscribers treat every event as "something changed, reload". The slot is
//! carried for logging only.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SlotNumber;

/// Kind of mutation that happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    /// A slot was reserved.
    Insert,
    /// An entry was updated (payment confirmed).
    Update,
    /// A slot was released.
    Delete,
    /// All entries were removed.
    Reset,
    /// The subscriber missed events and must reload.
    Resync,
}

/// One change to the entries table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What happened.
    pub op: ChangeOp,
    /// Affected slot, if the change concerned a single row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotNumber>,
}

impl ChangeEvent {
    /// A slot was reserved.
    #[must_use]
    pub const fn insert(slot: SlotNumber) -> Self {
        Self {
            op: ChangeOp::Insert,
            slot: Some(slot),
        }
    }

    /// An entry was updated.
    #[must_use]
    pub const fn update(slot: SlotNumber) -> Self {
        Self {
            op: ChangeOp::Update,
            slot: Some(slot),
        }
    }

    /// A slot was released.
    #[must_use]
    pub const fn delete(slot: SlotNumber) -> Self {
        Self {
            op: ChangeOp::Delete,
            slot: Some(slot),
        }
    }

    /// The table was emptied.
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            op: ChangeOp::Reset,
            slot: None,
        }
    }

    /// Events were dropped for this subscriber.
    #[must_use]
    pub const fn resync() -> Self {
        Self {
            op: ChangeOp::Resync,
            slot: None,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{:?}({slot})", self.op),
            None => write!(f, "{:?}", self.op),
        }
    }
}
