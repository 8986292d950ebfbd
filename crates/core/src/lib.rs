//! Fagot Core - Shared domain types.
//!
//! This crate provides common types used across all Fagot components:
//! - `storefront` - Public-facing shop API
//! - `admin` - Internal back-office API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure computation - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses
//! - [`cart`] - The cart aggregator: subtotal/shipping/tax/total and validation
//! - [`order_number`] - Human-readable order number format and candidates
//! - [`settings`] - The site settings payload (bank, shipping, tax, company)
//! - [`api`] - The JSON response envelope shared by both binaries
//! - [`upload`] - File upload constraints (size and MIME allow-lists)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod order_number;
#[cfg(feature = "postgres")]
pub mod rows;
pub mod settings;
pub mod types;
pub mod upload;

pub use types::*;
