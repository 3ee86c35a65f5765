//! Wishlist slice: saved product references plus the owning user.

use serde::{Deserialize, Serialize};

use cartwheel_core::{Price, ProductId, UserId};

/// A saved product reference, keyed by product ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
}

impl WishlistItem {
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image: None,
        }
    }
}

/// Wishlist state owned by the store.
///
/// Items behave as a set keyed by ID; insertion order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WishlistState {
    items: Vec<WishlistItem>,
    owner: Option<UserId>,
}

impl WishlistState {
    /// Create an empty, unowned wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            owner: None,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&WishlistItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert an item unless one with the same ID is already saved.
    ///
    /// Returns `true` if the item was inserted.
    pub fn add(&mut self, item: WishlistItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item with the given ID, returning it if present.
    pub fn remove(&mut self, id: &ProductId) -> Option<WishlistItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Replace all items. Later duplicates of an ID are dropped.
    pub fn replace(&mut self, items: Vec<WishlistItem>) {
        self.items.clear();
        for item in items {
            self.add(item);
        }
    }

    /// Empty the wishlist and drop its owner.
    pub fn clear(&mut self) {
        self.items.clear();
        self.owner = None;
    }

    pub fn assign_owner(&mut self, owner: UserId) {
        self.owner = Some(owner);
    }
}
