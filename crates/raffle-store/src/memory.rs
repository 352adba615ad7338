//! In-memory storage implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

use raffle_core::{ChangeEvent, NewReservation, RaffleEntry, SlotNumber};

use crate::error::{Result, StoreError};
use crate::feed::ChangeFeed;
use crate::Store;

/// Map-backed store. Entries live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<SlotNumber, RaffleEntry>>,
    feed: ChangeFeed,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store publishing on `feed`.
    #[must_use]
    pub fn with_feed(feed: ChangeFeed) -> Self {
        Self {
            entries: RwLock::default(),
            feed,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_entries(&self) -> Result<Vec<RaffleEntry>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn get_entry(&self, slot: SlotNumber) -> Result<Option<RaffleEntry>> {
        Ok(self.entries.read().await.get(&slot).cloned())
    }

    async fn reserve(&self, reservation: &NewReservation) -> Result<RaffleEntry> {
        let entry = {
            let mut entries = self.entries.write().await;
            if entries.contains_key(&reservation.slot) {
                return Err(StoreError::SlotTaken {
                    slot: reservation.slot,
                });
            }
            let entry = RaffleEntry::reserved(reservation, Utc::now());
            entries.insert(entry.slot, entry.clone());
            entry
        };

        self.feed.publish(ChangeEvent::insert(entry.slot));
        Ok(entry)
    }

    async fn reserve_batch(&self, reservations: &[NewReservation]) -> Result<Vec<RaffleEntry>> {
        let created = {
            let mut entries = self.entries.write().await;

            // Check everything before touching the map.
            let mut seen = Vec::with_capacity(reservations.len());
            for r in reservations {
                if entries.contains_key(&r.slot) || seen.contains(&r.slot) {
                    return Err(StoreError::SlotTaken { slot: r.slot });
                }
                seen.push(r.slot);
            }

            let now = Utc::now();
            reservations
                .iter()
                .map(|r| {
                    let entry = RaffleEntry::reserved(r, now);
                    entries.insert(entry.slot, entry.clone());
                    entry
                })
                .collect::<Vec<_>>()
        };

        for entry in &created {
            self.feed.publish(ChangeEvent::insert(entry.slot));
        }
        Ok(created)
    }

    async fn confirm_payment(&self, slot: SlotNumber) -> Result<RaffleEntry> {
        let entry = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(&slot)
                .ok_or(StoreError::NotFound { slot })?;
            entry.mark_paid(Utc::now());
            entry.clone()
        };

        self.feed.publish(ChangeEvent::update(slot));
        Ok(entry)
    }

    async fn unreserve(&self, slot: SlotNumber) -> Result<bool> {
        let removed = self.entries.write().await.remove(&slot).is_some();
        if removed {
            self.feed.publish(ChangeEvent::delete(slot));
        }
        Ok(removed)
    }

    async fn reset(&self) -> Result<u64> {
        let removed = {
            let mut entries = self.entries.write().await;
            let count = entries.len();
            entries.clear();
            count
        };

        self.feed.publish(ChangeEvent::reset());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}
