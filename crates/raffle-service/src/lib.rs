//! Raffle HTTP service.
//!
//! This crate provides the HTTP surface of the charity raffle:
//!
//! - Public pages and the entry listing
//! - Slot reservations (single and all-or-nothing batch)
//! - Admin payment confirmation, slot release and reset
//! - A Server-Sent Events change feed
//!
//! # Authentication
//!
//! Only admin endpoints are protected, by a shared PIN sent in the request
//! body or by a session token obtained from `POST /api/admin/session`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers must be async for routing

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
