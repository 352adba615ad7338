//! API handlers.

pub mod admin;
pub mod changes;
pub mod health;
pub mod pages;
pub mod raffle;

use serde::Serialize;

/// Plain success body: `{"ok": true}`.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always `true`.
    pub ok: bool,
}

impl OkResponse {
    /// The success body.
    #[must_use]
    pub const fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}
