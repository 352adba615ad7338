//! Server-Sent Events decoding for the change feed.

use std::collections::VecDeque;

use futures::stream::{self, Stream, StreamExt};

use raffle_core::ChangeEvent;

use crate::error::ClientError;

/// Event name the service uses for entry changes.
pub const CHANGE_EVENT_NAME: &str = "raffle";

/// One dispatched SSE message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

/// Incremental SSE decoder.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every message it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.buf.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(message) = self.dispatch() {
                    messages.push(message);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.strip_prefix(' ').unwrap_or(value);
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
        messages
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseMessage { event, data })
    }
}

/// Decode a change event from an SSE message.
///
/// Messages for other event names yield `Ok(None)`.
pub fn decode_change(message: &SseMessage) -> Result<Option<ChangeEvent>, ClientError> {
    if message.event.as_deref() != Some(CHANGE_EVENT_NAME) {
        return Ok(None);
    }
    serde_json::from_str(&message.data)
        .map(Some)
        .map_err(|e| ClientError::Stream(format!("{e}: {}", message.data)))
}

struct FeedState<S> {
    bytes: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<ChangeEvent, ClientError>>,
    done: bool,
}

/// Turn a response body into a stream of change events.
pub(crate) fn change_events<S, B>(bytes: S) -> impl Stream<Item = Result<ChangeEvent, ClientError>>
where
    S: Stream<Item = Result<B, reqwest::Error>>,
    B: AsRef<[u8]>,
{
    let state = FeedState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for message in state.decoder.push(chunk.as_ref()) {
                        if let Some(item) = decode_change(&message).transpose() {
                            state.pending.push_back(item);
                        }
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    state.pending.push_back(Err(ClientError::Http(e)));
                }
                None => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_core::{ChangeOp, SlotNumber};

    #[test]
    fn decodes_named_event() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.push(b"event: raffle\ndata: {\"op\":\"insert\",\"slot\":7}\n\n");

        assert_eq!(messages.len(), 1);
        let change = decode_change(&messages[0]).unwrap().unwrap();
        assert_eq!(change, ChangeEvent::insert(SlotNumber::new(7).unwrap()));
    }

    #[test]
    fn handles_split_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: raf").is_empty());
        assert!(decoder.push(b"fle\r\ndata: {\"op\":").is_empty());
        let messages = decoder.push(b"\"reset\"}\r\n\r\n");

        assert_eq!(messages.len(), 1);
        let change = decode_change(&messages[0]).unwrap().unwrap();
        assert_eq!(change.op, ChangeOp::Reset);
        assert_eq!(change.slot, None);
    }

    #[test]
    fn ignores_comments_and_empty_events() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.push(b":\n\n: keep-alive\n\nevent: raffle\n\n");
        assert!(messages.is_empty());
    }

    #[test]
    fn joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.push(b"data: a\ndata:b\n\n");
        assert_eq!(messages[0].data, "a\nb");
        assert_eq!(messages[0].event, None);
    }

    #[test]
    fn other_events_are_skipped() {
        let message = SseMessage {
            event: Some("other".into()),
            data: "{}".into(),
        };
        assert!(decode_change(&message).unwrap().is_none());
    }

    #[test]
    fn bad_payload_is_stream_error() {
        let message = SseMessage {
            event: Some(CHANGE_EVENT_NAME.into()),
            data: "not json".into(),
        };
        assert!(matches!(
            decode_change(&message),
            Err(ClientError::Stream(_))
        ));
    }
}
