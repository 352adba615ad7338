//! Raffle Client SDK.
//!
//! This crate provides a typed client for the raffle API and the view models
//! behind the public and admin pages.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use raffle_client::{PublicPage, RaffleClient};
//! use raffle_core::SlotNumber;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RaffleClient::new("http://localhost:8080")?;
//! let mut page = PublicPage::new(client.clone());
//! page.reload().await?;
//!
//! page.toggle(SlotNumber::new(7)?)?;
//! page.first_name = "Ana".into();
//! page.last_name = "Silva".into();
//! page.phone = "11999990000".into();
//! println!("Total: {}", page.total_label());
//! page.submit().await?;
//!
//! let changes = client.subscribe().await?;
//! futures::pin_mut!(changes);
//! while let Some(change) = changes.next().await {
//!     page.apply_change(&change?).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)] // Every call can fail on the network

mod client;
mod error;
pub mod pages;
pub mod stream;
mod types;

pub use client::{ClientOptions, RaffleClient};
pub use error::{ClientError, PageError};
pub use pages::{AdminPage, PublicPage, SlotState};
pub use types::*;
