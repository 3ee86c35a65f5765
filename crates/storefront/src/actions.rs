//! Typed actions accepted by [`crate::state::Store::dispatch`].
//!
//! Actions serialize as `{"type": "<name>", "payload": ...}` with camelCase
//! names, so a script of actions can be stored as JSON and replayed:
//!
//! ```json
//! [
//!   {"type": "login", "payload": {"id": "u1", "role": "user"}},
//!   {"type": "addToCart", "payload": {"id": 1, "title": "Mug", "price": 10}},
//!   {"type": "updateCartItemQuantity", "payload": {"id": 1, "quantity": 3}},
//!   {"type": "logout"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use cartwheel_core::{ProductId, UserId};

use crate::models::{CartLineItem, UserIdentity, WishlistItem};

/// A state transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// Add a line, merging quantity into an existing line with the same ID.
    AddToCart(CartLineItem),
    RemoveFromCart(ProductId),
    /// Raw quantity; values below one are rejected by the store.
    UpdateCartItemQuantity { id: ProductId, quantity: i64 },
    ClearCart,
    SetCartItems(Vec<CartLineItem>),
    SetCartUser(UserId),
    AddToWishlist(WishlistItem),
    RemoveFromWishlist(ProductId),
    ClearWishlist,
    SetWishlistItems(Vec<WishlistItem>),
    SetWishlistUser(UserId),
    Login(UserIdentity),
    Logout,
    UpdateAddress(String),
}

impl Action {
    /// Stable action name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart(_) => "addToCart",
            Self::RemoveFromCart(_) => "removeFromCart",
            Self::UpdateCartItemQuantity { .. } => "updateCartItemQuantity",
            Self::ClearCart => "clearCart",
            Self::SetCartItems(_) => "setCartItems",
            Self::SetCartUser(_) => "setCartUser",
            Self::AddToWishlist(_) => "addToWishlist",
            Self::RemoveFromWishlist(_) => "removeFromWishlist",
            Self::ClearWishlist => "clearWishlist",
            Self::SetWishlistItems(_) => "setWishlistItems",
            Self::SetWishlistUser(_) => "setWishlistUser",
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::UpdateAddress(_) => "updateAddress",
        }
    }
}
