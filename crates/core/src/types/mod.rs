//! Core types for Cue Shop.
//!
//! Newtype wrappers for domain concepts plus the record shapes exchanged
//! with the shop backend (camelCase JSON).

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;
pub mod supplier;
pub mod user;

pub use cart::CartItem;
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{DashboardStats, Order, OrderCustomer, OrderLine};
pub use price::Price;
pub use product::{Product, ProductForm};
pub use status::*;
pub use supplier::{Supplier, SupplierForm};
pub use user::{User, UserProfileUpdate};
