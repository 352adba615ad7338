//! Core types for the charity raffle.
//!
//! - **Slots**: `SlotNumber`, validated to `1..=100`
//! - **Entries**: `RaffleEntry`, `EntryStatus`, `NewReservation`
//! - **Changes**: `ChangeEvent`, pushed to subscribers on every mutation
//! - **Pricing**: ticket price, totals, and `R$` formatting
//!
//! # Entry lifecycle
//!
//! ```text
//! (absent) --reserve--> reserved --confirm--> paid
//!     ^                     |                   |
//!     +------unreserve------+-------------------+
//! ```
//!
//! A reset removes every entry at once.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod change;
pub mod entry;
pub mod error;
pub mod pricing;
pub mod slot;

pub use change::{ChangeEvent, ChangeOp};
pub use entry::{full_name, EntryStatus, NewReservation, RaffleEntry};
pub use error::{RaffleError, Result};
pub use pricing::{
    format_brl, total_due_cents, PaymentInfo, CURRENCY_SYMBOL, TICKET_PRICE_CENTS,
};
pub use slot::{SlotNumber, SLOT_COUNT};
