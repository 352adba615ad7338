//! Storage layer for raffle entries.
//!
//! The service talks to the entries table only through the [`Store`] trait.
//! Two backends are provided:
//!
//! - [`PgStore`]: PostgreSQL via sqlx. Uniqueness of `slot` is the table's
//!   primary key; changes are pushed by a `NOTIFY` trigger and relayed by a
//!   background `LISTEN` task.
//! - [`MemoryStore`]: an in-process map for tests and local runs.
//!
//! Both publish every mutation on a [`ChangeFeed`].
//!
//! # Example
//!
//! ```no_run
//! use raffle_core::{NewReservation, SlotNumber};
//! use raffle_store::{MemoryStore, Store};
//!
//! # async fn example() -> raffle_store::Result<()> {
//! let store = MemoryStore::new();
//! let slot = SlotNumber::new(7).expect("valid slot");
//! let reservation = NewReservation::new(slot, "Ana Silva", "11999999999").expect("valid");
//!
//! store.reserve(&reservation).await?;
//! let paid = store.confirm_payment(slot).await?;
//! assert!(paid.is_paid());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod feed;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::{Result, StoreError};
pub use feed::{ChangeFeed, DEFAULT_FEED_CAPACITY};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use tokio::sync::broadcast;

use raffle_core::{ChangeEvent, NewReservation, RaffleEntry, SlotNumber};

/// The storage trait defining every operation on the entries table.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// List every entry, ordered by slot ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_entries(&self) -> Result<Vec<RaffleEntry>>;

    /// Get the entry for a slot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_entry(&self, slot: SlotNumber) -> Result<Option<RaffleEntry>>;

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Reserve a single slot.
    ///
    /// # Errors
    ///
    /// - `StoreError::SlotTaken` if the slot already has an entry; the
    ///   existing entry is left untouched.
    async fn reserve(&self, reservation: &NewReservation) -> Result<RaffleEntry>;

    /// Reserve several slots all-or-nothing.
    ///
    /// # Errors
    ///
    /// - `StoreError::SlotTaken` naming the first taken slot; nothing is
    ///   reserved in that case.
    async fn reserve_batch(&self, reservations: &[NewReservation]) -> Result<Vec<RaffleEntry>>;

    /// Mark a slot paid and return the updated entry.
    ///
    /// Confirming an already-paid entry keeps its first `paid_at`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the slot has no entry.
    async fn confirm_payment(&self, slot: SlotNumber) -> Result<RaffleEntry>;

    /// Release a slot. Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails. A missing entry is
    /// not an error.
    async fn unreserve(&self, slot: SlotNumber) -> Result<bool>;

    /// Remove every entry and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn reset(&self) -> Result<u64>;

    // =========================================================================
    // Change feed
    // =========================================================================

    /// Subscribe to changes on the entries table.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
