//! Checkout page.
//!
//! Holds the page-local state (address draft, loading flag, banners) and
//! turns shopper input into store actions and checkout service calls.
//! Quantity changes below one are refused here before they reach the store.

use serde::Serialize;
use tracing::instrument;

use cartwheel_core::ProductId;

use crate::actions::Action;
use crate::models::{CartLineItem, OrderConfirmation};
use crate::services::checkout::{CheckoutError, CheckoutService, CheckoutSummary};
use crate::services::gateway::CheckoutGateway;
use crate::services::notify::{Notice, Notifier};
use crate::state::Store;

/// Placeholder shown for products without an image.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/mug.jpg";

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
    /// The decrement button is disabled at quantity one.
    pub can_decrement: bool,
}

/// Cart display data for the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub heading: String,
    pub items: Vec<CartItemView>,
    pub item_count: usize,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    pub is_empty: bool,
    /// Label of the checkout button.
    pub checkout_label: String,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            quantity: item.quantity.get(),
            price: item.price.display(),
            line_price: item
                .line_total()
                .map_or_else(|_| "-".to_string(), |price| price.display()),
            image: item
                .image
                .clone()
                .unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string()),
            can_decrement: item.quantity.get() > 1,
        }
    }
}

impl CartView {
    fn build(items: &[CartLineItem], summary: &CheckoutSummary) -> Self {
        let heading = if items.is_empty() {
            "Your Cart".to_string()
        } else {
            format!("Cart ({})", pluralize_items(items.len()))
        };
        Self {
            heading,
            items: items.iter().map(CartItemView::from).collect(),
            item_count: summary.item_count,
            subtotal: summary.subtotal.display(),
            shipping_fee: summary.shipping_fee.display(),
            total: summary.total.display(),
            is_empty: items.is_empty(),
            checkout_label: format!("Proceed to Checkout - {}", summary.total.display()),
        }
    }
}

/// "1 item" / "N items".
pub(crate) fn pluralize_items(count: usize) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

/// Checkout page state.
pub struct CheckoutPage<G, N> {
    service: CheckoutService<G>,
    notifier: N,
    shipping_address: String,
    editing_address: bool,
    loading: bool,
    error: Option<String>,
    success: Option<String>,
}

impl<G: CheckoutGateway, N: Notifier> CheckoutPage<G, N> {
    /// Open the page, pre-filling the address from the session.
    #[must_use]
    pub fn open(service: CheckoutService<G>, notifier: N, store: &Store) -> Self {
        Self {
            service,
            notifier,
            shipping_address: store.session().address().unwrap_or_default().to_string(),
            editing_address: false,
            loading: false,
            error: None,
            success: None,
        }
    }

    /// Render the cart and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the totals overflow.
    pub fn view(&self, store: &Store) -> Result<CartView, CheckoutError> {
        let summary = self.service.summary(store)?;
        Ok(CartView::build(store.cart().items(), &summary))
    }

    #[must_use]
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn is_editing_address(&self) -> bool {
        self.editing_address
    }

    /// The checkout button is enabled only when idle with an address.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        !self.loading && !self.shipping_address.trim().is_empty()
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Change a line's quantity. Values below one are refused with a notice
    /// and never reach the store.
    ///
    /// Returns `true` if the store accepted the change.
    pub fn change_quantity(&self, store: &mut Store, id: ProductId, quantity: i64) -> bool {
        if quantity < 1 {
            self.notifier
                .notify(Notice::error("Quantity must be at least 1"));
            return false;
        }
        match store.dispatch(Action::UpdateCartItemQuantity { id, quantity }) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Quantity change rejected");
                false
            }
        }
    }

    /// Remove a line from the cart.
    pub fn remove_item(&self, store: &mut Store, id: ProductId) {
        match store.dispatch(Action::RemoveFromCart(id)) {
            Ok(()) => self.notifier.notify(Notice::success("Item removed from cart!")),
            Err(err) => self.notifier.notify(Notice::error(err.to_string())),
        }
    }

    /// Start editing the address.
    pub const fn edit_address(&mut self) {
        self.editing_address = true;
    }

    /// Stop editing without saving.
    pub const fn cancel_edit(&mut self) {
        self.editing_address = false;
    }

    /// Replace the address draft. Clears any error banner.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.shipping_address = address.into();
        self.error = None;
    }

    /// Save the address draft to the user's account.
    #[instrument(skip_all)]
    pub async fn save_address(&mut self, store: &mut Store) {
        if self.shipping_address.trim().is_empty() {
            self.error = Some(CheckoutError::InvalidAddress.user_message().to_string());
            return;
        }

        self.loading = true;
        self.error = None;
        let result = self
            .service
            .save_address(store, &self.shipping_address)
            .await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.editing_address = false;
                self.success = Some("Address updated successfully!".to_string());
            }
            Err(err) => self.error = Some(err.user_message().to_string()),
        }
    }

    /// Place the order.
    ///
    /// Returns the confirmation on success; failures are reported through
    /// the page's error banner.
    #[instrument(skip_all)]
    pub async fn checkout(&mut self, store: &mut Store) -> Option<OrderConfirmation> {
        self.loading = true;
        self.error = None;
        let result = self
            .service
            .place_order(store, &self.shipping_address)
            .await;
        self.loading = false;

        match result {
            Ok(confirmation) => {
                self.success = Some("Order placed successfully! Redirecting...".to_string());
                self.notifier
                    .notify(Notice::success("Order placed successfully!"));
                Some(confirmation)
            }
            Err(err) => {
                self.error = Some(err.user_message().to_string());
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::{CurrencyCode, Price, Quantity, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::models::UserIdentity;
    use crate::services::gateway::SimulatedGateway;
    use crate::services::notify::RecordingNotifier;

    fn usd(amount: i64) -> Price {
        Price::new(Decimal::from(amount), CurrencyCode::USD)
    }

    fn page(store: &Store) -> CheckoutPage<SimulatedGateway, RecordingNotifier> {
        let service = CheckoutService::new(SimulatedGateway::instant(), &StorefrontConfig::default());
        CheckoutPage::open(service, RecordingNotifier::new(), store)
    }

    fn store_with_mug() -> Store {
        let mut store = Store::default();
        store
            .login(UserIdentity::new("u1", "user").with_address("1 Main St"))
            .unwrap();
        store
            .add_to_cart(
                CartLineItem::new("mug", "Mug", usd(10)).with_quantity(Quantity::new(2).unwrap()),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_view_formats_cart() {
        let store = store_with_mug();
        let view = page(&store).view(&store).unwrap();

        assert_eq!(view.heading, "Cart (1 item)");
        assert_eq!(view.subtotal, "US $20.00");
        assert_eq!(view.shipping_fee, "US $10.00");
        assert_eq!(view.total, "US $30.00");
        assert_eq!(view.checkout_label, "Proceed to Checkout - US $30.00");
        let item = view.items.first().unwrap();
        assert_eq!(item.line_price, "US $20.00");
        assert_eq!(item.image, DEFAULT_PRODUCT_IMAGE);
        assert!(item.can_decrement);
    }

    #[test]
    fn test_empty_view() {
        let store = Store::default();
        let view = page(&store).view(&store).unwrap();
        assert!(view.is_empty);
        assert_eq!(view.heading, "Your Cart");
        assert_eq!(view.total, "US $0.00");
    }

    #[test]
    fn test_open_prefills_address() {
        let store = store_with_mug();
        let page = page(&store);
        assert_eq!(page.shipping_address(), "1 Main St");
        assert!(page.can_checkout());
    }

    #[test]
    fn test_change_quantity_refuses_below_one() {
        let mut store = store_with_mug();
        let page = page(&store);

        assert!(!page.change_quantity(&mut store, ProductId::new("mug"), 0));
        assert_eq!(store.cart().total_quantity(), 2);
        assert_eq!(
            page.notifier().last(),
            Some(Notice::error("Quantity must be at least 1"))
        );

        assert!(page.change_quantity(&mut store, ProductId::new("mug"), 5));
        assert_eq!(store.cart().total(), usd(50));
    }

    #[test]
    fn test_remove_item_notifies() {
        let mut store = store_with_mug();
        let page = page(&store);
        page.remove_item(&mut store, ProductId::new("mug"));

        assert!(store.cart().is_empty());
        assert_eq!(
            page.notifier().last(),
            Some(Notice::success("Item removed from cart!"))
        );
    }

    #[tokio::test]
    async fn test_checkout_success() {
        let mut store = store_with_mug();
        let mut page = page(&store);

        let confirmation = page.checkout(&mut store).await.unwrap();

        assert_eq!(confirmation.total, usd(30));
        assert!(store.cart().is_empty());
        assert_eq!(store.cart().owner(), Some(&UserId::new("u1")));
        assert_eq!(page.success(), Some("Order placed successfully! Redirecting..."));
        assert!(!page.is_loading());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_shows_error() {
        let mut store = Store::default();
        let mut page = page(&store);
        page.set_address("1 Main St");

        assert!(page.checkout(&mut store).await.is_none());
        assert_eq!(page.error(), Some("Your cart is empty"));
        assert!(page.notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn test_save_blank_address_shows_error() {
        let mut store = store_with_mug();
        let mut page = page(&store);
        page.edit_address();
        page.set_address("  ");

        page.save_address(&mut store).await;

        assert_eq!(page.error(), Some("Please enter a valid shipping address"));
        assert!(page.is_editing_address());
        assert_eq!(store.session().address(), Some("1 Main St"));
    }

    #[tokio::test]
    async fn test_save_address_success() {
        let mut store = store_with_mug();
        let mut page = page(&store);
        page.edit_address();
        page.set_address("9 Elm St");

        page.save_address(&mut store).await;

        assert!(page.error().is_none());
        assert!(!page.is_editing_address());
        assert_eq!(page.success(), Some("Address updated successfully!"));
        assert_eq!(store.session().address(), Some("9 Elm St"));
    }
}
