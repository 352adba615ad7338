//! PostgreSQL storage implementation.
//!
//! Mutations are plain single-statement queries; the only multi-statement
//! operation is [`Store::reserve_batch`], which runs in one transaction.
//! Change events are not published from here: the table triggers send a
//! `NOTIFY` for every inserted or updated row and once per `DELETE`
//! statement, so writes from other processes reach subscribers too.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgListener, PgPool, PgPoolOptions};
use tokio::sync::broadcast;

use raffle_core::{ChangeEvent, NewReservation, RaffleEntry, SlotNumber};

use crate::error::{Result, StoreError};
use crate::feed::ChangeFeed;
use crate::schema::{sql, CHANGES_CHANNEL};
use crate::Store;

/// Delay before re-listening after the notification connection fails.
const LISTEN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    feed: ChangeFeed,
}

/// Row shape of `raffle_entries`.
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    slot: i16,
    buyer_name: String,
    phone: String,
    status: String,
    reserved_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<EntryRow> for RaffleEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self> {
        Ok(Self {
            slot: SlotNumber::new(i64::from(row.slot))
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            buyer_name: row.buyer_name,
            phone: row.phone,
            status: row
                .status
                .parse()
                .map_err(|e: raffle_core::RaffleError| StoreError::Corrupt(e.to_string()))?,
            reserved_at: row.reserved_at,
            paid_at: row.paid_at,
        })
    }
}

impl PgStore {
    /// Connect to `database_url`, run migrations and start relaying
    /// notifications onto the change feed.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the migrations fail.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Use an existing pool. Runs migrations and starts the listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the migrations fail.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let feed = ChangeFeed::default();
        tokio::spawn(relay_notifications(pool.clone(), feed.clone()));

        Ok(Self { pool, feed })
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_entries(&self) -> Result<Vec<RaffleEntry>> {
        sqlx::query_as::<_, EntryRow>(sql::LIST_ENTRIES)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(RaffleEntry::try_from)
            .collect()
    }

    async fn get_entry(&self, slot: SlotNumber) -> Result<Option<RaffleEntry>> {
        sqlx::query_as::<_, EntryRow>(sql::GET_ENTRY)
            .bind(i16::from(slot))
            .fetch_optional(&self.pool)
            .await?
            .map(RaffleEntry::try_from)
            .transpose()
    }

    async fn reserve(&self, reservation: &NewReservation) -> Result<RaffleEntry> {
        let row = sqlx::query_as::<_, EntryRow>(sql::INSERT_ENTRY)
            .bind(i16::from(reservation.slot))
            .bind(&reservation.buyer_name)
            .bind(&reservation.phone)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_insert(e, reservation.slot))?;

        RaffleEntry::try_from(row)
    }

    async fn reserve_batch(&self, reservations: &[NewReservation]) -> Result<Vec<RaffleEntry>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(reservations.len());

        for r in reservations {
            // Dropping `tx` on error rolls the whole batch back.
            let row = sqlx::query_as::<_, EntryRow>(sql::INSERT_ENTRY)
                .bind(i16::from(r.slot))
                .bind(&r.buyer_name)
                .bind(&r.phone)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| StoreError::from_insert(e, r.slot))?;
            created.push(RaffleEntry::try_from(row)?);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn confirm_payment(&self, slot: SlotNumber) -> Result<RaffleEntry> {
        sqlx::query_as::<_, EntryRow>(sql::CONFIRM_ENTRY)
            .bind(i16::from(slot))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { slot })
            .and_then(RaffleEntry::try_from)
    }

    async fn unreserve(&self, slot: SlotNumber) -> Result<bool> {
        let result = sqlx::query(sql::DELETE_ENTRY)
            .bind(i16::from(slot))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset(&self) -> Result<u64> {
        let result = sqlx::query(sql::DELETE_ALL).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}

/// Forward `NOTIFY` payloads from the change trigger onto `feed`.
///
/// Runs until the pool is closed. Connection failures are retried and
/// announced to subscribers as a resync, since notifications sent while
/// disconnected are lost.
async fn relay_notifications(pool: PgPool, feed: ChangeFeed) {
    loop {
        if pool.is_closed() {
            tracing::debug!("Pool closed, stopping change listener");
            return;
        }

        let mut listener = match PgListener::connect_with(&pool).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open change listener");
                tokio::time::sleep(LISTEN_RETRY_DELAY).await;
                continue;
            }
        };

        if let Err(e) = listener.listen(CHANGES_CHANNEL).await {
            tracing::warn!(error = %e, channel = CHANGES_CHANNEL, "LISTEN failed");
            tokio::time::sleep(LISTEN_RETRY_DELAY).await;
            continue;
        }

        tracing::info!(channel = CHANGES_CHANNEL, "Listening for entry changes");

        loop {
            match listener.recv().await {
                Ok(notification) => match parse_notification(notification.payload()) {
                    Some(event) => feed.publish(event),
                    None => {
                        tracing::warn!(payload = notification.payload(), "Unparseable change");
                        feed.publish(ChangeEvent::resync());
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Change listener disconnected");
                    feed.publish(ChangeEvent::resync());
                    tokio::time::sleep(LISTEN_RETRY_DELAY).await;
                    break;
                }
            }
        }
    }
}

fn parse_notification(payload: &str) -> Option<ChangeEvent> {
    serde_json::from_str(payload).ok()
}
