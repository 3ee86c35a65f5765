//! The store: single dispatch point for all state changes.
//!
//! Consumers hold a `&Store` to read and a `&mut Store` to dispatch, so
//! mutations are serialized by the borrow checker. After every applied
//! action the ownership reconciler runs against the new state and its
//! commands are applied before `dispatch` returns.

use serde::Serialize;
use tracing::{debug, instrument};

use cartwheel_core::{CurrencyCode, Price, ProductId, UserId};

use crate::actions::Action;
use crate::config::StorefrontConfig;
use crate::error::{self, Result};
use crate::models::{
    CartLineItem, CartState, SessionState, UserIdentity, WishlistItem, WishlistState,
};
use crate::services::reconciler::{self, OwnershipCommand, OwnershipSnapshot, Target};

/// Upper bound on reconcile passes per dispatch. One pass always reaches a
/// fixed point; the bound only guards against a future rule that doesn't.
const MAX_RECONCILE_PASSES: usize = 4;

/// Cart, wishlist and session state behind a typed dispatch interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    cart: CartState,
    wishlist: WishlistState,
    session: SessionState,
}

// Commands that cannot fail in practice still return `Result` to match `dispatch`.
#[allow(clippy::missing_errors_doc)]
impl Store {
    /// Create an empty store with an anonymous session.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            cart: CartState::new(currency),
            wishlist: WishlistState::new(),
            session: SessionState::new(),
        }
    }

    /// Create an empty store priced in the configured currency.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.currency)
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistState {
        &self.wishlist
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Serializable view of the whole store, including the derived total.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot<'_> {
        StoreSnapshot {
            session: &self.session,
            cart: CartSnapshot {
                items: self.cart.items(),
                total: self.cart.total(),
                owner: self.cart.owner(),
            },
            wishlist: &self.wishlist,
        }
    }

    /// Apply an action, then reconcile ownership.
    ///
    /// # Errors
    ///
    /// Returns an error if the action would violate a cart invariant or is
    /// not allowed in the current session. State is unchanged on error.
    #[instrument(skip_all, fields(action = action.name()))]
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        self.apply(action)?;
        self.reconcile();
        Ok(())
    }

    /// Apply a sequence of actions, stopping at the first rejected one.
    ///
    /// # Errors
    ///
    /// Returns the index of the rejected action together with its error.
    pub fn dispatch_all(
        &mut self,
        actions: impl IntoIterator<Item = Action>,
    ) -> std::result::Result<(), (usize, error::StoreError)> {
        for (index, action) in actions.into_iter().enumerate() {
            self.dispatch(action).map_err(|err| (index, err))?;
        }
        Ok(())
    }

    // =========================================================================
    // Typed commands
    // =========================================================================

    /// Add a line item to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is invalid or the quantity overflows.
    pub fn add_to_cart(&mut self, item: CartLineItem) -> Result<()> {
        self.dispatch(Action::AddToCart(item))
    }

    /// Remove a line item from the cart. Unknown IDs are ignored.
    ///
    /// # Errors
    ///
    /// Never fails in practice.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<()> {
        self.dispatch(Action::RemoveFromCart(id))
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is below one.
    pub fn update_cart_item_quantity(&mut self, id: ProductId, quantity: i64) -> Result<()> {
        self.dispatch(Action::UpdateCartItemQuantity { id, quantity })
    }

    /// Empty the cart. A logged-in user keeps ownership of the empty cart.
    ///
    /// # Errors
    ///
    /// Never fails in practice.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.dispatch(Action::ClearCart)
    }

    /// Replace all cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate IDs or invalid prices.
    pub fn set_cart_items(&mut self, items: Vec<CartLineItem>) -> Result<()> {
        self.dispatch(Action::SetCartItems(items))
    }

    /// Attribute the cart to a user. A mismatch with the session is
    /// corrected by reconciliation before this returns.
    pub fn set_cart_user(&mut self, id: UserId) -> Result<()> {
        self.dispatch(Action::SetCartUser(id))
    }

    /// Save a product to the wishlist. Already saved IDs are ignored.
    pub fn add_to_wishlist(&mut self, item: WishlistItem) -> Result<()> {
        self.dispatch(Action::AddToWishlist(item))
    }

    /// Remove a product from the wishlist. Unknown IDs are ignored.
    pub fn remove_from_wishlist(&mut self, id: ProductId) -> Result<()> {
        self.dispatch(Action::RemoveFromWishlist(id))
    }

    /// Empty the wishlist. A logged-in user keeps ownership of it.
    pub fn clear_wishlist(&mut self) -> Result<()> {
        self.dispatch(Action::ClearWishlist)
    }

    /// Replace all wishlist items, keeping the first of any duplicate IDs.
    pub fn set_wishlist_items(&mut self, items: Vec<WishlistItem>) -> Result<()> {
        self.dispatch(Action::SetWishlistItems(items))
    }

    /// Attribute the wishlist to a user, subject to reconciliation.
    pub fn set_wishlist_user(&mut self, id: UserId) -> Result<()> {
        self.dispatch(Action::SetWishlistUser(id))
    }

    /// Log a user in. Cart and wishlist ownership follow via reconciliation:
    /// anonymous contents are adopted, another user's contents are dropped.
    pub fn login(&mut self, identity: UserIdentity) -> Result<()> {
        self.dispatch(Action::Login(identity))
    }

    /// Log out and empty the cart and wishlist, including anonymous ones.
    pub fn logout(&mut self) -> Result<()> {
        self.dispatch(Action::Logout)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::AddToCart(item) => self.cart.add(item)?,
            Action::RemoveFromCart(id) => {
                if self.cart.remove(&id).is_none() {
                    debug!(product_id = %id, "Remove from cart ignored, no such line");
                }
            }
            Action::UpdateCartItemQuantity { id, quantity } => {
                let quantity = cartwheel_core::Quantity::new(quantity)?;
                if !self.cart.set_quantity(&id, quantity)? {
                    debug!(product_id = %id, "Quantity update ignored, no such line");
                }
            }
            Action::ClearCart => self.cart.clear(),
            Action::SetCartItems(items) => self.cart.replace(items)?,
            Action::SetCartUser(id) => self.cart.assign_owner(id),
            Action::AddToWishlist(item) => {
                if !self.wishlist.add(item) {
                    debug!("Wishlist add ignored, item already saved");
                }
            }
            Action::RemoveFromWishlist(id) => {
                self.wishlist.remove(&id);
            }
            Action::ClearWishlist => self.wishlist.clear(),
            Action::SetWishlistItems(items) => self.wishlist.replace(items),
            Action::SetWishlistUser(id) => self.wishlist.assign_owner(id),
            Action::Login(identity) => {
                error::set_sentry_user(&identity.id);
                self.session.login(identity);
            }
            Action::Logout => {
                self.session.logout();
                // Ending a session always empties both, owned or not.
                self.cart.clear();
                self.wishlist.clear();
                error::clear_sentry_user();
            }
            Action::UpdateAddress(address) => self.session.update_address(&address)?,
        }
        Ok(())
    }

    fn ownership(&self) -> OwnershipSnapshot<'_> {
        OwnershipSnapshot {
            current_user: self.session.user_id(),
            cart_owner: self.cart.owner(),
            wishlist_owner: self.wishlist.owner(),
        }
    }

    fn reconcile(&mut self) {
        for _ in 0..MAX_RECONCILE_PASSES {
            let commands = reconciler::reconcile(&self.ownership());
            if commands.is_empty() {
                return;
            }
            for command in commands {
                debug!(?command, "Applying ownership command");
                self.apply_ownership(command);
            }
        }
        tracing::warn!("Ownership reconciliation did not settle");
    }

    fn apply_ownership(&mut self, command: OwnershipCommand) {
        match command {
            OwnershipCommand::Clear {
                target: Target::Cart,
            } => self.cart.clear(),
            OwnershipCommand::Clear {
                target: Target::Wishlist,
            } => self.wishlist.clear(),
            OwnershipCommand::Assign {
                target: Target::Cart,
                user_id,
            } => self.cart.assign_owner(user_id),
            OwnershipCommand::Assign {
                target: Target::Wishlist,
                user_id,
            } => self.wishlist.assign_owner(user_id),
        }
    }
}

/// Serializable view of the store.
#[derive(Debug, Serialize)]
pub struct StoreSnapshot<'a> {
    pub session: &'a SessionState,
    pub cart: CartSnapshot<'a>,
    pub wishlist: &'a WishlistState,
}

/// Serializable view of the cart with its derived total.
#[derive(Debug, Serialize)]
pub struct CartSnapshot<'a> {
    pub items: &'a [CartLineItem],
    pub total: Price,
    pub owner: Option<&'a UserId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::Quantity;
    use rust_decimal::Decimal;

    use super::*;
    use crate::error::StoreError;

    fn usd(amount: i64) -> Price {
        Price::new(Decimal::from(amount), CurrencyCode::USD)
    }

    fn line(id: &str, amount: i64, quantity: i64) -> CartLineItem {
        CartLineItem::new(id, format!("Item {id}"), usd(amount))
            .with_quantity(Quantity::new(quantity).unwrap())
    }

    #[test]
    fn test_anonymous_cart_has_no_owner() {
        let mut store = Store::default();
        store.add_to_cart(line("a", 5, 1)).unwrap();
        assert!(store.cart().owner().is_none());
        assert_eq!(store.cart().item_count(), 1);
    }

    #[test]
    fn test_login_adopts_anonymous_cart() {
        let mut store = Store::default();
        store.add_to_cart(line("a", 5, 2)).unwrap();
        store.login(UserIdentity::new("u1", "user")).unwrap();

        assert_eq!(store.cart().owner(), Some(&UserId::new("u1")));
        assert_eq!(store.wishlist().owner(), Some(&UserId::new("u1")));
        assert_eq!(store.cart().total(), usd(10));
    }

    #[test]
    fn test_user_switch_clears_previous_users_cart() {
        let mut store = Store::default();
        store.login(UserIdentity::new("b", "user")).unwrap();
        store.add_to_cart(line("x", 20, 1)).unwrap();
        store.add_to_cart(line("y", 15, 2)).unwrap();
        assert_eq!(store.cart().total(), usd(50));

        store.login(UserIdentity::new("a", "user")).unwrap();

        assert!(store.cart().is_empty());
        assert!(store.cart().total().is_zero());
        assert_eq!(store.cart().owner(), Some(&UserId::new("a")));
    }

    #[test]
    fn test_logout_clears_cart_and_wishlist() {
        let mut store = Store::default();
        store.login(UserIdentity::new("u1", "user")).unwrap();
        store.add_to_cart(line("a", 5, 1)).unwrap();
        store
            .add_to_wishlist(WishlistItem::new("w", "Wish", usd(3)))
            .unwrap();

        store.logout().unwrap();

        assert!(store.cart().is_empty());
        assert!(store.cart().owner().is_none());
        assert!(store.wishlist().is_empty());
        assert!(store.wishlist().owner().is_none());
        assert!(!store.session().is_authenticated());
    }

    #[test]
    fn test_anonymous_logout_clears_unowned_cart_and_wishlist() {
        let mut store = Store::default();
        store.add_to_cart(line("mug", 10, 2)).unwrap();
        store
            .add_to_wishlist(WishlistItem::new("tea", "Tea", usd(5)))
            .unwrap();

        store.logout().unwrap();

        assert!(store.cart().is_empty());
        assert!(store.cart().total().is_zero());
        assert!(store.wishlist().is_empty());
    }

    #[test]
    fn test_manual_owner_mismatch_is_corrected() {
        let mut store = Store::default();
        store.login(UserIdentity::new("a", "user")).unwrap();
        store.add_to_cart(line("x", 1, 1)).unwrap();

        store.set_cart_user(UserId::new("intruder")).unwrap();

        assert!(store.cart().is_empty());
        assert_eq!(store.cart().owner(), Some(&UserId::new("a")));
    }

    #[test]
    fn test_clear_cart_while_logged_in_reassigns_owner() {
        let mut store = Store::default();
        store.login(UserIdentity::new("a", "user")).unwrap();
        store.add_to_cart(line("x", 1, 1)).unwrap();
        store.clear_cart().unwrap();

        assert!(store.cart().is_empty());
        assert_eq!(store.cart().owner(), Some(&UserId::new("a")));
    }

    #[test]
    fn test_non_positive_quantity_rejected_without_change() {
        let mut store = Store::default();
        store.add_to_cart(line("a", 5, 2)).unwrap();
        let before = store.clone();

        let err = store
            .update_cart_item_quantity(ProductId::new("a"), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::Cart(_)));
        assert!(store.update_cart_item_quantity(ProductId::new("a"), -3).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_update_address_requires_session() {
        let mut store = Store::default();
        let err = store
            .dispatch(Action::UpdateAddress("1 Main St".to_string()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Session(_)));
    }

    #[test]
    fn test_dispatch_all_reports_failing_index() {
        let mut store = Store::default();
        let result = store.dispatch_all([
            Action::AddToCart(line("a", 1, 1)),
            Action::UpdateCartItemQuantity {
                id: ProductId::new("a"),
                quantity: 0,
            },
            Action::ClearCart,
        ]);
        assert!(matches!(result, Err((1, StoreError::Cart(_)))));
        assert_eq!(store.cart().item_count(), 1);
    }

    #[test]
    fn test_snapshot_includes_derived_total() {
        let mut store = Store::default();
        store.add_to_cart(line("a", 10, 3)).unwrap();
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["cart"]["total"]["amount"], "30");
        assert_eq!(json["cart"]["items"][0]["quantity"], 3);
    }
}
