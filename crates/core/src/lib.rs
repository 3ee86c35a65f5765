//! Cartwheel Core - Shared types library.
//!
//! This crate provides common types used across all Cartwheel components:
//! - `storefront` - Cart, wishlist and session state with ownership reconciliation
//! - `cli` - Command-line tools for replaying action scripts
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async runtime, no logging.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
