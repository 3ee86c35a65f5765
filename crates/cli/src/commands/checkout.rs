//! Replay an action script, then place an order through the simulated gateway.

use std::path::Path;

use tracing::info;

use cartwheel_storefront::StorefrontConfig;
use cartwheel_storefront::services::{CheckoutService, SimulatedGateway, TracingNotifier};
use cartwheel_storefront::views::CheckoutPage;

/// Run a checkout against the store produced by the script at `path`.
///
/// Prints the cart summary and the order confirmation as JSON.
///
/// # Errors
///
/// Returns an error if the script fails to replay, the address cannot be
/// saved, or the order is not placed.
pub async fn run(
    path: &Path,
    address: Option<&str>,
    save_address: bool,
    config: &StorefrontConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let actions = super::load_script(path).await?;
    let mut store = super::replay_into_store(actions, config)?;

    let service = CheckoutService::new(SimulatedGateway::new(&config.checkout), config);
    let mut page = CheckoutPage::open(service, TracingNotifier, &store);
    if let Some(address) = address {
        page.set_address(address);
    }

    super::print_json(&page.view(&store)?)?;

    if save_address {
        page.save_address(&mut store).await;
        if let Some(message) = page.error() {
            return Err(message.into());
        }
    }

    let Some(confirmation) = page.checkout(&mut store).await else {
        return Err(page.error().unwrap_or("Order was not placed").into());
    };

    info!(order_id = %confirmation.order_id, "Checkout complete");
    super::print_json(&confirmation)
}
