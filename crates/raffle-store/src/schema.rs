//! Table, channel and query definitions for the PostgreSQL backend.
//!
//! The table and its change trigger are created by `migrations/`.

/// `LISTEN/NOTIFY` channel the change trigger publishes to.
pub const CHANGES_CHANNEL: &str = "raffle_entries_changes";

/// SQL statements used by `PgStore`.
pub mod sql {
    /// All entries in slot order.
    pub const LIST_ENTRIES: &str = "SELECT slot, buyer_name, phone, status, reserved_at, paid_at \
         FROM raffle_entries ORDER BY slot";

    /// One entry by slot.
    pub const GET_ENTRY: &str = "SELECT slot, buyer_name, phone, status, reserved_at, paid_at \
         FROM raffle_entries WHERE slot = $1";

    /// Insert a reservation. The primary key rejects taken slots.
    pub const INSERT_ENTRY: &str = "INSERT INTO raffle_entries (slot, buyer_name, phone, status) \
         VALUES ($1, $2, $3, 'reserved') \
         RETURNING slot, buyer_name, phone, status, reserved_at, paid_at";

    /// Mark an entry paid, keeping the first `paid_at` if it is already paid.
    pub const CONFIRM_ENTRY: &str = "UPDATE raffle_entries \
         SET status = 'paid', paid_at = COALESCE(paid_at, now()) \
         WHERE slot = $1 \
         RETURNING slot, buyer_name, phone, status, reserved_at, paid_at";

    /// Remove one entry.
    pub const DELETE_ENTRY: &str = "DELETE FROM raffle_entries WHERE slot = $1";

    /// Remove every entry.
    pub const DELETE_ALL: &str = "DELETE FROM raffle_entries";
}
