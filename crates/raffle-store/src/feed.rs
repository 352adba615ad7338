//! In-process fan-out of change events.

use tokio::sync::broadcast;

use raffle_core::ChangeEvent;

/// Default number of buffered events per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Broadcast channel carrying [`ChangeEvent`]s to every subscriber.
///
/// Slow subscribers lag rather than block publishers; a lagged receiver
/// should treat the gap as a full resync.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        tracing::debug!(%event, receivers, "Change published");
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
