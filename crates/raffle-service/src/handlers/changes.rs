//! Realtime change feed over Server-Sent Events.
//!
//! Each change to the entries table is sent as an event named `raffle` whose
//! data is a JSON [`ChangeEvent`]. Clients reload the full list on every
//! event; nothing is merged incrementally.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use raffle_core::ChangeEvent;

use crate::state::AppState;

/// SSE event name for entry changes.
pub const CHANGE_EVENT_NAME: &str = "raffle";

/// Interval between keep-alive comments.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Stream entry changes to the caller.
pub async fn stream_changes(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Change feed subscriber connected");

    let events = change_stream(state.store.subscribe()).map(|change| Ok(to_sse(change)));

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

/// Turn a broadcast receiver into a stream of changes.
///
/// A lagged receiver yields a single [`ChangeEvent::resync`] in place of the
/// missed events. The stream ends when the feed is closed.
pub fn change_stream(rx: broadcast::Receiver<ChangeEvent>) -> impl Stream<Item = ChangeEvent> {
    stream::unfold(rx, |mut rx| async move {
        let change = match rx.recv().await {
            Ok(change) => change,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Change subscriber lagged, requesting resync");
                ChangeEvent::resync()
            }
            Err(RecvError::Closed) => return None,
        };
        Some((change, rx))
    })
}

fn to_sse(change: ChangeEvent) -> Event {
    Event::default()
        .event(CHANGE_EVENT_NAME)
        .json_data(change)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to encode change event");
            Event::default()
                .event(CHANGE_EVENT_NAME)
                .data(r#"{"op":"resync"}"#)
        })
}
