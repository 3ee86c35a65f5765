//! Cartwheel storefront state.
//!
//! A single [`Store`](state::Store) holds the cart, wishlist and session
//! slices. Every change goes through [`Store::dispatch`](state::Store::dispatch),
//! after which cart and wishlist ownership is reconciled against the session.
//! The checkout and wishlist views in [`views`] build on top of it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod views;

pub use actions::Action;
pub use config::StorefrontConfig;
pub use error::StoreError;
pub use state::Store;
