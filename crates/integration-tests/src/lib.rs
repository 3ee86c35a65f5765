//! Integration tests for Cartwheel.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `ownership` - Login, logout and user switches across cart and wishlist
//! - `cart_totals` - Derived totals under arbitrary mutation sequences
//! - `checkout_flow` - Checkout page against simulated and failing gateways
//! - `wishlist_view` - Wishlist page and move-to-cart
//!
//! This crate holds the fixtures shared by those tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;

use cartwheel_core::{CurrencyCode, Price, Quantity};
use cartwheel_storefront::models::{CartLineItem, UserIdentity, WishlistItem};

/// A USD price in whole dollars.
#[must_use]
pub fn usd(amount: i64) -> Price {
    Price::new(Decimal::from(amount), CurrencyCode::USD)
}

/// A cart line for `id` at `price` dollars.
///
/// # Panics
///
/// Panics if `quantity` is below one.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn line(id: &str, price: i64, quantity: i64) -> CartLineItem {
    CartLineItem::new(id, format!("Product {id}"), usd(price))
        .with_quantity(Quantity::new(quantity).unwrap())
}

/// A wishlist entry for `id` at `price` dollars.
#[must_use]
pub fn wish(id: &str, price: i64) -> WishlistItem {
    WishlistItem::new(id, format!("Product {id}"), usd(price))
}

/// A plain user identity without a saved address.
#[must_use]
pub fn user(id: &str) -> UserIdentity {
    UserIdentity::new(id, "user")
}
