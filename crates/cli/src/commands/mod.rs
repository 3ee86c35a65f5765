//! CLI command implementations.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use cartwheel_storefront::{Action, Store, StorefrontConfig};

pub mod checkout;
pub mod replay;

/// Read an action script from disk.
async fn load_script(path: &Path) -> Result<Vec<Action>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    let content = tokio::fs::read_to_string(path).await?;
    let actions = parse_script(&content)?;
    info!(path = %path.display(), actions = actions.len(), "Loaded action script");
    Ok(actions)
}

fn parse_script(content: &str) -> Result<Vec<Action>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Build a store from configuration and replay `actions` against it.
fn replay_into_store(
    actions: Vec<Action>,
    config: &StorefrontConfig,
) -> Result<Store, Box<dyn std::error::Error>> {
    let mut store = Store::from_config(config);
    store
        .dispatch_all(actions)
        .map_err(|(index, err)| format!("action #{index} rejected: {err}"))?;
    Ok(store)
}

/// Write `value` to stdout as pretty JSON.
fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
