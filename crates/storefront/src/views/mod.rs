//! Page-level consumers of the store.
//!
//! Views read state through `&Store`, dispatch through `&mut Store`, and
//! report outcomes to the shopper through a [`Notifier`](crate::services::Notifier).

pub mod checkout;
pub mod wishlist;

pub use checkout::{CartItemView, CartView, CheckoutPage};
pub use wishlist::{WishlistItemView, WishlistPage, WishlistView};
