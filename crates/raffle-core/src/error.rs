//! Error types for raffle domain validation.

/// Result type for raffle domain operations.
pub type Result<T> = std::result::Result<T, RaffleError>;

/// Errors raised while validating raffle input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RaffleError {
    /// Slot outside `1..=100`.
    #[error("invalid slot: {0} (expected 1-100)")]
    InvalidSlot(i64),

    /// Slot given as text that is not a number.
    #[error("invalid slot: {0:?}")]
    InvalidSlotText(String),

    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Unknown entry status.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Another reservation already uses this buyer name.
    #[error("a reservation already exists for {0}")]
    DuplicateName(String),
}
