//! Checkout: order summary, address saving and order placement.
//!
//! Validation failures (empty cart, blank address) are refused before any
//! gateway call and leave the store untouched. Gateway calls are bounded by
//! the configured timeout and are never retried automatically; each order
//! attempt carries a fresh idempotency key so a shopper-initiated retry
//! cannot double-charge if the previous attempt did land.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use cartwheel_core::{Price, PriceError};

use crate::actions::Action;
use crate::config::StorefrontConfig;
use crate::error::{self, StoreError};
use crate::models::{CartState, OrderConfirmation, OrderRequest, SessionError};
use crate::services::gateway::{CheckoutGateway, GatewayError};
use crate::state::Store;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Order attempted without a shipping address.
    #[error("shipping address is missing")]
    MissingAddress,

    /// Address save attempted with blank input.
    #[error("shipping address is blank")]
    InvalidAddress,

    /// Saving the address failed at the gateway.
    #[error("address save failed: {0}")]
    AddressSave(#[source] GatewayError),

    /// Placing the order failed at the gateway.
    #[error("order placement failed: {0}")]
    OrderPlacement(#[source] GatewayError),

    /// Order totals could not be computed.
    #[error("price error: {0}")]
    Price(#[from] PriceError),

    /// The store rejected a follow-up action.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// Message safe to show the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty",
            Self::MissingAddress => "Please enter a shipping address",
            Self::InvalidAddress => "Please enter a valid shipping address",
            Self::AddressSave(_) => "Failed to update address. Please try again.",
            Self::Store(StoreError::Session(SessionError::NotAuthenticated)) => {
                "Please log in to save a shipping address"
            }
            Self::OrderPlacement(_) | Self::Price(_) | Self::Store(_) => {
                "Failed to place order. Please try again."
            }
        }
    }

    /// Whether the shopper can fix this by changing their input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyCart | Self::MissingAddress | Self::InvalidAddress
        )
    }
}

/// Order totals shown before checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    /// Number of distinct lines.
    pub item_count: usize,
    pub subtotal: Price,
    /// Flat fee, waived when the subtotal is zero.
    pub shipping_fee: Price,
    pub total: Price,
}

impl CheckoutSummary {
    /// Compute totals for a cart.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total does not fit.
    pub fn for_cart(cart: &CartState, flat_fee: Decimal) -> Result<Self, PriceError> {
        let subtotal = cart.total();
        let shipping_fee = if subtotal.amount > Decimal::ZERO {
            Price::new(flat_fee, cart.currency())
        } else {
            Price::zero(cart.currency())
        };
        let total = subtotal.checked_add(&shipping_fee)?;
        Ok(Self {
            item_count: cart.item_count(),
            subtotal,
            shipping_fee,
            total,
        })
    }
}

/// Checkout operations against a store through a gateway.
#[derive(Debug)]
pub struct CheckoutService<G> {
    gateway: G,
    shipping_fee: Decimal,
    timeout: Duration,
}

impl<G: CheckoutGateway> CheckoutService<G> {
    /// Create a checkout service from configuration.
    #[must_use]
    pub fn new(gateway: G, config: &StorefrontConfig) -> Self {
        Self {
            gateway,
            shipping_fee: config.shipping_fee,
            timeout: config.checkout.order_timeout,
        }
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Totals for the store's current cart.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total does not fit.
    pub fn summary(&self, store: &Store) -> Result<CheckoutSummary, PriceError> {
        CheckoutSummary::for_cart(store.cart(), self.shipping_fee)
    }

    /// Save the logged-in user's shipping address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is blank, nobody is logged in, or
    /// the gateway fails or times out. The session is unchanged on error.
    #[instrument(skip_all)]
    pub async fn save_address(&self, store: &mut Store, address: &str) -> Result<(), CheckoutError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CheckoutError::InvalidAddress);
        }
        let user_id = store
            .session()
            .user_id()
            .cloned()
            .ok_or(StoreError::Session(SessionError::NotAuthenticated))?;

        let saved = tokio::time::timeout(self.timeout, self.gateway.save_address(&user_id, address))
            .await
            .unwrap_or(Err(GatewayError::TimedOut(self.timeout)));
        if let Err(err) = saved {
            let err = CheckoutError::AddressSave(err);
            error::report(&err, "Failed to update address");
            return Err(err);
        }

        store.dispatch(Action::UpdateAddress(address.to_owned()))?;
        Ok(())
    }

    /// Place an order for the store's cart, shipping to `address`.
    ///
    /// On success the cart is cleared. On any failure the cart is left as
    /// it was so the shopper can retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, the address is blank, or the
    /// gateway fails or times out.
    #[instrument(skip_all, fields(items = store.cart().item_count()))]
    pub async fn place_order(
        &self,
        store: &mut Store,
        address: &str,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let request = self.build_request(store, address)?;

        let submitted = tokio::time::timeout(self.timeout, self.gateway.submit_order(&request))
            .await
            .unwrap_or(Err(GatewayError::TimedOut(self.timeout)));
        let confirmation = match submitted {
            Ok(confirmation) => confirmation,
            Err(err) => {
                let err = CheckoutError::OrderPlacement(err);
                error::report(&err, "Failed to place order");
                return Err(err);
            }
        };

        store.dispatch(Action::ClearCart)?;
        info!(order_id = %confirmation.order_id, "Order placed");
        Ok(confirmation)
    }

    fn build_request(&self, store: &Store, address: &str) -> Result<OrderRequest, CheckoutError> {
        let cart = store.cart();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(CheckoutError::MissingAddress);
        }

        let summary = CheckoutSummary::for_cart(cart, self.shipping_fee)?;
        Ok(OrderRequest {
            idempotency_key: Uuid::new_v4(),
            user_id: store.session().user_id().cloned(),
            items: cart.items().to_vec(),
            shipping_address: address.to_owned(),
            subtotal: summary.subtotal,
            shipping_fee: summary.shipping_fee,
            total: summary.total,
            order_date: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cartwheel_core::{CurrencyCode, UserId};

    use super::*;
    use crate::models::{CartLineItem, UserIdentity};
    use crate::services::gateway::SimulatedGateway;

    fn usd(amount: i64) -> Price {
        Price::new(Decimal::from(amount), CurrencyCode::USD)
    }

    fn service() -> CheckoutService<SimulatedGateway> {
        CheckoutService::new(SimulatedGateway::instant(), &StorefrontConfig::default())
    }

    /// Gateway that fails every call and counts attempts.
    #[derive(Default)]
    struct FailingGateway {
        calls: AtomicUsize,
    }

    impl CheckoutGateway for FailingGateway {
        async fn save_address(&self, _: &UserId, _: &str) -> Result<(), GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Unavailable("down".to_string()))
        }

        async fn submit_order(&self, _: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Unavailable("down".to_string()))
        }
    }

    /// Gateway that never answers.
    struct StalledGateway;

    impl CheckoutGateway for StalledGateway {
        async fn save_address(&self, _: &UserId, _: &str) -> Result<(), GatewayError> {
            std::future::pending().await
        }

        async fn submit_order(&self, _: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
            std::future::pending().await
        }
    }

    fn logged_in_store_with_items() -> Store {
        let mut store = Store::default();
        store.login(UserIdentity::new("u1", "user")).unwrap();
        store
            .add_to_cart(CartLineItem::new("mug", "Mug", usd(12)))
            .unwrap();
        store
    }

    #[test]
    fn test_summary_adds_fee_only_when_non_empty() {
        let empty = CartState::default();
        let summary = CheckoutSummary::for_cart(&empty, Decimal::TEN).unwrap();
        assert!(summary.shipping_fee.is_zero());
        assert!(summary.total.is_zero());

        let store = logged_in_store_with_items();
        let summary = service().summary(&store).unwrap();
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.subtotal, usd(12));
        assert_eq!(summary.shipping_fee, usd(10));
        assert_eq!(summary.total, usd(22));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_without_mutation() {
        let mut store = Store::default();
        store.login(UserIdentity::new("u1", "user")).unwrap();
        let before = store.clone();

        let err = service().place_order(&mut store, "1 Main St").await.unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Your cart is empty");
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected() {
        let mut store = logged_in_store_with_items();
        let err = service().place_order(&mut store, "   ").await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingAddress));
        assert_eq!(store.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_successful_order_clears_cart_keeps_owner() {
        let mut store = logged_in_store_with_items();
        let checkout = service();

        let confirmation = checkout.place_order(&mut store, "1 Main St").await.unwrap();

        assert_eq!(confirmation.total, usd(22));
        assert!(store.cart().is_empty());
        assert_eq!(store.cart().owner(), Some(&UserId::new("u1")));
        assert_eq!(checkout.gateway().order_count(), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_cart_and_does_not_retry() {
        let mut store = logged_in_store_with_items();
        let checkout = CheckoutService::new(FailingGateway::default(), &StorefrontConfig::default());

        let err = checkout.place_order(&mut store, "1 Main St").await.unwrap_err();

        assert!(matches!(err, CheckoutError::OrderPlacement(_)));
        assert_eq!(err.user_message(), "Failed to place order. Please try again.");
        assert_eq!(store.cart().item_count(), 1);
        assert_eq!(checkout.gateway().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_gateway_times_out() {
        let mut store = logged_in_store_with_items();
        let checkout = CheckoutService::new(StalledGateway, &StorefrontConfig::default());

        let err = checkout.place_order(&mut store, "1 Main St").await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::OrderPlacement(GatewayError::TimedOut(_))
        ));
        assert_eq!(store.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_save_address_updates_session() {
        let mut store = logged_in_store_with_items();
        service()
            .save_address(&mut store, "  42 Harbor Rd ")
            .await
            .unwrap();
        assert_eq!(store.session().address(), Some("42 Harbor Rd"));
    }

    #[tokio::test]
    async fn test_save_address_validation() {
        let mut store = Store::default();
        let checkout = service();

        let err = checkout.save_address(&mut store, " ").await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidAddress));

        let err = checkout.save_address(&mut store, "1 Main St").await.unwrap_err();
        assert_eq!(err.user_message(), "Please log in to save a shipping address");
    }

    #[tokio::test]
    async fn test_save_address_gateway_failure_leaves_session() {
        let mut store = logged_in_store_with_items();
        let checkout = CheckoutService::new(FailingGateway::default(), &StorefrontConfig::default());

        let err = checkout.save_address(&mut store, "1 Main St").await.unwrap_err();

        assert_eq!(err.user_message(), "Failed to update address. Please try again.");
        assert!(store.session().address().is_none());
    }
}
