//! Cue Shop Core - Shared domain types.
//!
//! This crate provides the types used across all Cue Shop components:
//! - `storefront` - Session, cart, catalog and checkout for customers
//! - `admin` - Administration panel operations (products, suppliers, orders)
//! - `cli` - The command-line screens composing the two
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, statuses and backend records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
