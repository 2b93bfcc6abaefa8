//! Cue Shop admin panel operations.
//!
//! Everything behind the `/admin` pages: the dashboard, product and supplier
//! management, and the order table. All calls go through an [`AdminClient`]
//! bound to an administrator's token.
//!
//! # Security
//!
//! The backend enforces the `ADMIN` role on every endpoint used here. The
//! client-side role check in [`AdminClient::from_session`] only saves a
//! round trip.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod dashboard;
pub mod error;
pub mod orders;
pub mod products;
pub mod suppliers;

pub use client::AdminClient;
pub use dashboard::Dashboard;
pub use error::{AdminError, Result};
pub use orders::{DateWindow, OrderFilter};
