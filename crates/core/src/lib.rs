//! Roastline Core - Shared types library.
//!
//! This crate provides common types used across all Roastline components:
//! - `storefront` - Public-facing e-commerce site
//! - `admin` - Internal back office for order management
//! - `cli` - Command-line tools for seeding and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money, newtype IDs, order statuses, shipping/payment methods,
//!   and the normalized pickup-store shape shared by the map providers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
