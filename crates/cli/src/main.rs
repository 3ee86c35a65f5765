//! Cartwheel CLI - replay store actions and run simulated checkouts.
//!
//! # Usage
//!
//! ```bash
//! # Replay a JSON action script and print the resulting store snapshot
//! cw-cli replay session.json
//!
//! # Replay a script, then place an order through the simulated gateway
//! cw-cli checkout session.json --address "1 Main St"
//!
//! # Save the address to the logged-in account before ordering
//! cw-cli checkout session.json --address "1 Main St" --save-address
//! ```
//!
//! A script is a JSON array of actions, e.g.
//! `[{"type": "login", "payload": {"id": "u1", "role": "user"}}]`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cartwheel_storefront::StorefrontConfig;
use cartwheel_storefront::telemetry;

mod commands;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Cartwheel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an action script and print the store snapshot
    Replay {
        /// Path to a JSON array of actions
        file: PathBuf,
    },
    /// Replay an action script, then place an order
    Checkout {
        /// Path to a JSON array of actions
        file: PathBuf,

        /// Shipping address (defaults to the session's saved address)
        #[arg(short, long)]
        address: Option<String>,

        /// Save the address to the logged-in account first
        #[arg(long)]
        save_address: bool,
    },
}

#[tokio::main]
async fn main() {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet, so write straight to stderr.
            let _ = writeln!(std::io::stderr(), "Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config);

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Replay { file } => commands::replay::run(&file, config).await?,
        Commands::Checkout {
            file,
            address,
            save_address,
        } => {
            commands::checkout::run(&file, address.as_deref(), save_address, config).await?;
        }
    }
    Ok(())
}
