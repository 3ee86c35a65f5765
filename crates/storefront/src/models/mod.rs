//! State slices owned by the store.
//!
//! - [`cart`] - Ordered line items with a derived total
//! - [`wishlist`] - Saved product references
//! - [`session`] - The authenticated user
//! - [`order`] - Order requests and confirmations exchanged at checkout
//!
//! Slices only know how to mutate themselves. Ownership of the cart and
//! wishlist is decided by [`crate::services::reconciler`].

pub mod cart;
pub mod order;
pub mod session;
pub mod wishlist;

pub use cart::{CartError, CartLineItem, CartState};
pub use order::{OrderConfirmation, OrderRequest};
pub use session::{SessionError, SessionState, UserIdentity};
pub use wishlist::{WishlistItem, WishlistState};
