//! Cart slice: ordered line items plus the owning user.
//!
//! The cart total is never stored. It is derived from the current items on
//! every read, so it cannot drift from the item contents. Every mutation is
//! validated against a candidate item list before it is committed; a
//! rejected mutation leaves the cart untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartwheel_core::{CurrencyCode, Price, PriceError, ProductId, Quantity, QuantityError, UserId};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity is zero, negative, or would overflow.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Price is negative, in the wrong currency, or the total overflows.
    #[error("invalid price for item {id}: {source}")]
    InvalidPrice {
        id: ProductId,
        #[source]
        source: PriceError,
    },

    /// A bulk replacement contained the same product twice.
    #[error("duplicate line item: {0}")]
    DuplicateItem(ProductId),
}

/// A product reference plus quantity held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product ID; at most one line per product.
    pub id: ProductId,
    /// Product title shown to the shopper.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Number of units. Defaults to one when omitted.
    #[serde(default)]
    pub quantity: Quantity,
    /// Product image URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLineItem {
    /// Create a line item with a quantity of one.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            quantity: Quantity::ONE,
            image: None,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Price of this line (`price × quantity`).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.price.times(self.quantity)
    }
}

/// Cart state owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartState {
    items: Vec<CartLineItem>,
    owner: Option<UserId>,
    currency: CurrencyCode,
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

impl CartState {
    /// Create an empty, unowned cart priced in `currency`.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            owner: None,
            currency,
        }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The user this cart is attributed to, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Currency all line prices must use.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Cart total: `Σ price × quantity` over the current items.
    ///
    /// Mutations reject any item list whose total would overflow, so the
    /// saturating arithmetic here never actually saturates.
    #[must_use]
    pub fn total(&self) -> Price {
        let amount = self.items.iter().fold(Decimal::ZERO, |acc, item| {
            acc.saturating_add(
                item.price
                    .amount
                    .saturating_mul(Decimal::from(item.quantity.get())),
            )
        });
        Price::new(amount, self.currency)
    }

    /// Add a line item.
    ///
    /// If a line with the same product ID exists its quantity is increased by
    /// the incoming quantity; otherwise the item is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is invalid or the quantity overflows.
    pub fn add(&mut self, item: CartLineItem) -> Result<(), CartError> {
        self.validate_price(&item)?;

        let mut candidate = self.items.clone();
        match candidate.iter_mut().find(|line| line.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(item.quantity)?;
            }
            None => candidate.push(item),
        }
        self.commit(candidate)
    }

    /// Remove the line with the given product ID.
    ///
    /// Returns the removed line, or `None` if no line matched.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLineItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `Ok(false)` without changes if no line has that ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting total would overflow.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: Quantity) -> Result<bool, CartError> {
        let mut candidate = self.items.clone();
        let Some(line) = candidate.iter_mut().find(|line| &line.id == id) else {
            return Ok(false);
        };
        line.quantity = quantity;
        self.commit(candidate)?;
        Ok(true)
    }

    /// Replace all lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the list contains duplicate product IDs or an
    /// invalid price. The cart is unchanged on error.
    pub fn replace(&mut self, items: Vec<CartLineItem>) -> Result<(), CartError> {
        for (index, item) in items.iter().enumerate() {
            self.validate_price(item)?;
            if items.iter().skip(index + 1).any(|other| other.id == item.id) {
                return Err(CartError::DuplicateItem(item.id.clone()));
            }
        }
        self.commit(items)
    }

    /// Empty the cart and drop its owner.
    pub fn clear(&mut self) {
        self.items.clear();
        self.owner = None;
    }

    /// Attribute the cart to a user.
    pub fn assign_owner(&mut self, owner: UserId) {
        self.owner = Some(owner);
    }

    fn validate_price(&self, item: &CartLineItem) -> Result<(), CartError> {
        let invalid = |source| CartError::InvalidPrice {
            id: item.id.clone(),
            source,
        };
        item.price.validate().map_err(invalid)?;
        if item.price.currency_code != self.currency {
            return Err(invalid(PriceError::CurrencyMismatch {
                expected: self.currency,
                actual: item.price.currency_code,
            }));
        }
        Ok(())
    }

    fn commit(&mut self, candidate: Vec<CartLineItem>) -> Result<(), CartError> {
        candidate
            .iter()
            .try_fold(Price::zero(self.currency), |total, item| {
                item.line_total()
                    .and_then(|line| total.checked_add(&line))
                    .map_err(|source| CartError::InvalidPrice {
                        id: item.id.clone(),
                        source,
                    })
            })?;
        self.items = candidate;
        Ok(())
    }
}
