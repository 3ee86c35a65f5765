//! Replay an action script and print the resulting store.

use std::path::Path;

use tracing::info;

use cartwheel_storefront::StorefrontConfig;

/// Replay the script at `path` and print the store snapshot as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if an action
/// is rejected by the store.
pub async fn run(path: &Path, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let actions = super::load_script(path).await?;
    let store = super::replay_into_store(actions, config)?;

    info!(
        lines = store.cart().item_count(),
        wishlist = store.wishlist().len(),
        authenticated = store.session().is_authenticated(),
        "Replay finished"
    );
    super::print_json(&store.snapshot())
}
