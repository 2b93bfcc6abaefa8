//! Cue Shop storefront client library.
//!
//! Everything a shopper (or an administrator signing in) touches, minus the
//! admin panel itself:
//!
//! - [`session`] - Login, registration, logout and the profile fetch that
//!   follows every token change
//! - [`cart`] - The shopping cart, persisted across restarts
//! - [`guards`] / [`routes`] - Route guards, the page table and the navigator
//! - [`api`] - Thin HTTP wrapper over the shop REST backend
//! - [`catalog`], [`checkout`], [`orders`], [`wishlist`] - The remaining
//!   shopper screens
//! - [`state`] - Wires all of the above onto one storage directory

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod forms;
pub mod guards;
pub mod notify;
pub mod orders;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod wishlist;
