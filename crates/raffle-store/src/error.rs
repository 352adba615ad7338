//! Error types for raffle storage.

use raffle_core::SlotNumber;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The slot already has an entry.
    #[error("slot {slot} is already taken")]
    SlotTaken {
        /// The contested slot.
        slot: SlotNumber,
    },

    /// No entry exists for the slot.
    #[error("no entry for slot {slot}")]
    NotFound {
        /// The slot that was looked up.
        slot: SlotNumber,
    },

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be turned into an entry.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Running migrations failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// Map a sqlx error for an insert into `slot`.
    pub(crate) fn from_insert(err: sqlx::Error, slot: SlotNumber) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::SlotTaken { slot },
            _ => Self::from(err),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}
