//! Wishlist page.

use serde::Serialize;
use tracing::instrument;

use cartwheel_core::ProductId;

use crate::actions::Action;
use crate::models::{CartLineItem, WishlistItem};
use crate::services::notify::{Notice, Notifier};
use crate::state::Store;

use super::checkout::{DEFAULT_PRODUCT_IMAGE, pluralize_items};

const MISSING_ITEM: &str = "Item is no longer in your wishlist";

/// Wishlist item display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItemView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub image: String,
    /// Product detail link.
    pub href: String,
}

/// Wishlist display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistView {
    pub heading: String,
    pub items: Vec<WishlistItemView>,
    pub is_empty: bool,
}

impl From<&WishlistItem> for WishlistItemView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            price: item.price.display(),
            image: item
                .image
                .clone()
                .unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string()),
            href: format!("/productDetail/{}", item.id),
        }
    }
}

/// Wishlist page actions.
pub struct WishlistPage<N> {
    notifier: N,
}

impl<N: Notifier> WishlistPage<N> {
    #[must_use]
    pub const fn new(notifier: N) -> Self {
        Self { notifier }
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    #[must_use]
    pub fn view(&self, store: &Store) -> WishlistView {
        let items = store.wishlist().items();
        WishlistView {
            heading: format!("My Wishlist ({})", pluralize_items(items.len())),
            items: items.iter().map(WishlistItemView::from).collect(),
            is_empty: items.is_empty(),
        }
    }

    /// Remove an item from the wishlist.
    pub fn remove(&self, store: &mut Store, id: &ProductId) {
        let Some(title) = store.wishlist().get(id).map(|item| item.title.clone()) else {
            self.notifier.notify(Notice::error(MISSING_ITEM));
            return;
        };
        match store.dispatch(Action::RemoveFromWishlist(id.clone())) {
            Ok(()) => self
                .notifier
                .notify(Notice::success(format!("{title} removed from wishlist!"))),
            Err(err) => self.notifier.notify(Notice::error(err.to_string())),
        }
    }

    /// Remove every saved item. The wishlist stays attributed to its owner.
    ///
    /// Does nothing on an empty wishlist.
    pub fn clear_all(&self, store: &mut Store) {
        if store.wishlist().is_empty() {
            return;
        }
        match store.dispatch(Action::SetWishlistItems(Vec::new())) {
            Ok(()) => self.notifier.notify(Notice::success("Wishlist cleared!")),
            Err(err) => self.notifier.notify(Notice::error(err.to_string())),
        }
    }

    /// Move an item into the cart with quantity one.
    ///
    /// The item is only removed from the wishlist once the cart accepted it.
    /// Returns `true` if the item was moved.
    #[instrument(skip(self, store), fields(product_id = %id))]
    pub fn move_to_cart(&self, store: &mut Store, id: &ProductId) -> bool {
        let Some(item) = store.wishlist().get(id).cloned() else {
            self.notifier.notify(Notice::error(MISSING_ITEM));
            return false;
        };

        let line = CartLineItem::new(item.id.clone(), item.title.clone(), item.price)
            .with_image(item.image.unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string()));
        if let Err(err) = store.dispatch(Action::AddToCart(line)) {
            tracing::warn!(error = %err, "Move to cart rejected");
            self.notifier.notify(Notice::error(format!(
                "Could not move {} to cart",
                item.title
            )));
            return false;
        }

        if let Err(err) = store.dispatch(Action::RemoveFromWishlist(item.id)) {
            self.notifier.notify(Notice::error(err.to_string()));
            return false;
        }
        self.notifier
            .notify(Notice::success(format!("{} moved to cart!", item.title)));
        true
    }
}
