//! Checkout page driven end to end against gateway implementations.

#![allow(clippy::unwrap_used)]

use cartwheel_core::{ProductId, UserId};
use cartwheel_integration_tests::{line, user, usd};
use cartwheel_storefront::config::StorefrontConfig;
use cartwheel_storefront::models::{OrderConfirmation, OrderRequest};
use cartwheel_storefront::services::{
    CheckoutGateway, CheckoutService, GatewayError, Notice, RecordingNotifier, SimulatedGateway,
};
use cartwheel_storefront::views::CheckoutPage;
use cartwheel_storefront::{Action, Store};

/// Gateway that accepts address saves and rejects every order.
struct RejectingGateway;

impl CheckoutGateway for RejectingGateway {
    async fn save_address(&self, _: &UserId, _: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn submit_order(&self, _: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        Err(GatewayError::Rejected("card declined".to_string()))
    }
}

/// Default timing: 1s address save, 2s order, 10s timeout.
fn config() -> StorefrontConfig {
    StorefrontConfig::default()
}

fn shopper() -> Store {
    let mut store = Store::from_config(&config());
    store
        .dispatch_all([
            Action::Login(user("a").with_address("1 Main St")),
            Action::AddToCart(line("mug", 12, 2)),
            Action::AddToCart(line("pot", 30, 1)),
        ])
        .unwrap();
    store
}

#[tokio::test(start_paused = true)]
async fn order_is_placed_and_cart_cleared() {
    let config = config();
    let mut store = shopper();
    let service = CheckoutService::new(SimulatedGateway::new(&config.checkout), &config);
    let mut page = CheckoutPage::open(service, RecordingNotifier::new(), &store);

    let view = page.view(&store).unwrap();
    assert_eq!(view.heading, "Cart (2 items)");
    assert_eq!(view.total, "US $64.00");

    let confirmation = page.checkout(&mut store).await.unwrap();

    assert_eq!(confirmation.total, usd(64));
    assert!(confirmation.order_id.as_str().starts_with("ord_"));
    assert!(store.cart().is_empty());
    assert_eq!(store.cart().owner(), Some(&UserId::new("a")));
    assert_eq!(
        page.notifier().last(),
        Some(Notice::success("Order placed successfully!"))
    );
}

#[tokio::test]
async fn empty_cart_is_rejected_without_mutation() {
    let mut store = Store::default();
    store.login(user("a").with_address("1 Main St")).unwrap();
    let before = store.clone();
    let service = CheckoutService::new(SimulatedGateway::instant(), &StorefrontConfig::default());
    let mut page = CheckoutPage::open(service, RecordingNotifier::new(), &store);

    assert!(page.checkout(&mut store).await.is_none());

    assert_eq!(store, before);
    assert_eq!(page.error(), Some("Your cart is empty"));
    assert!(page.notifier().notices().is_empty());
}

#[tokio::test]
async fn declined_order_keeps_cart_for_retry() {
    let mut store = shopper();
    let service = CheckoutService::new(RejectingGateway, &StorefrontConfig::default());
    let mut page = CheckoutPage::open(service, RecordingNotifier::new(), &store);

    assert!(page.checkout(&mut store).await.is_none());

    assert_eq!(page.error(), Some("Failed to place order. Please try again."));
    assert_eq!(store.cart().item_count(), 2);
    assert!(!page.is_loading());
    assert!(page.can_checkout());
}

#[tokio::test]
async fn guest_checkout_places_order_without_user() {
    let mut store = Store::default();
    store.add_to_cart(line("mug", 12, 1)).unwrap();
    let service = CheckoutService::new(SimulatedGateway::instant(), &StorefrontConfig::default());
    let mut page = CheckoutPage::open(service, RecordingNotifier::new(), &store);
    assert!(!page.can_checkout());

    page.set_address("7 Guest Ln");
    let confirmation = page.checkout(&mut store).await.unwrap();

    assert_eq!(confirmation.total, usd(22));
    assert!(store.cart().is_empty());
}

#[tokio::test(start_paused = true)]
async fn saved_address_is_used_for_the_order() {
    let config = config();
    let mut store = shopper();
    let service = CheckoutService::new(SimulatedGateway::new(&config.checkout), &config);
    let mut page = CheckoutPage::open(service, RecordingNotifier::new(), &store);

    page.edit_address();
    page.set_address("42 Harbor Rd");
    page.save_address(&mut store).await;
    assert_eq!(store.session().address(), Some("42 Harbor Rd"));

    page.change_quantity(&mut store, ProductId::new("pot"), 2);
    let confirmation = page.checkout(&mut store).await.unwrap();
    assert_eq!(confirmation.total, usd(94));
}

#[tokio::test]
async fn anonymous_address_save_asks_for_login() {
    let mut store = Store::default();
    store.add_to_cart(line("mug", 12, 1)).unwrap();
    let service = CheckoutService::new(SimulatedGateway::instant(), &StorefrontConfig::default());
    let mut page = CheckoutPage::open(service, RecordingNotifier::new(), &store);

    page.set_address("1 Main St");
    page.save_address(&mut store).await;

    assert_eq!(page.error(), Some("Please log in to save a shipping address"));
    assert!(store.session().address().is_none());
}
