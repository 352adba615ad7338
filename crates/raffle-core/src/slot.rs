//! Slot numbers.
//!
//! A raffle has [`SLOT_COUNT`] numbered slots, starting at 1. `SlotNumber`
//! is the only way to name one, so an out-of-range slot never reaches the
//! store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RaffleError;

/// Number of slots in the raffle.
pub const SLOT_COUNT: u8 = 100;

/// A validated slot number in `1..=SLOT_COUNT`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SlotNumber(u8);

impl SlotNumber {
    /// Lowest slot.
    pub const FIRST: Self = Self(1);

    /// Highest slot.
    pub const LAST: Self = Self(SLOT_COUNT);

    /// Create a slot number, checking the range.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::InvalidSlot` if `value` is outside `1..=SLOT_COUNT`.
    pub fn new(value: i64) -> Result<Self, RaffleError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=SLOT_COUNT).contains(v))
            .map(Self)
            .ok_or(RaffleError::InvalidSlot(value))
    }

    /// Return the slot as a plain integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterate over every slot in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SLOT_COUNT).map(Self)
    }
}

impl FromStr for SlotNumber {
    type Err = RaffleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| RaffleError::InvalidSlotText(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for SlotNumber {
    type Error = RaffleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlotNumber> for i64 {
    fn from(slot: SlotNumber) -> Self {
        Self::from(slot.0)
    }
}

impl From<SlotNumber> for i16 {
    fn from(slot: SlotNumber) -> Self {
        Self::from(slot.0)
    }
}

impl fmt::Debug for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotNumber({})", self.0)
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
