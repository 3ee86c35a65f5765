//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CARTWHEEL_CURRENCY` - Cart currency (default: USD)
//! - `CARTWHEEL_SHIPPING_FEE` - Flat shipping fee for non-empty orders (default: 10)
//! - `CARTWHEEL_ADDRESS_SAVE_DELAY_MS` - Simulated address save latency (default: 1000)
//! - `CARTWHEEL_CHECKOUT_DELAY_MS` - Simulated order placement latency (default: 2000)
//! - `CARTWHEEL_CHECKOUT_TIMEOUT_MS` - Upper bound on order placement (default: 10000)
//! - `CARTWHEEL_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use cartwheel_core::CurrencyCode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Currency all cart prices use
    pub currency: CurrencyCode,
    /// Flat shipping fee charged when the subtotal is non-zero
    pub shipping_fee: Decimal,
    /// Checkout gateway timing
    pub checkout: CheckoutConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Timing for the simulated checkout gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Latency of saving a shipping address
    pub address_save_delay: Duration,
    /// Latency of placing an order
    pub order_delay: Duration,
    /// Time after which an order attempt is abandoned
    pub order_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            address_save_delay: Duration::from_millis(1000),
            order_delay: Duration::from_millis(2000),
            order_timeout: Duration::from_millis(10_000),
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            shipping_fee: Decimal::TEN,
            checkout: CheckoutConfig::default(),
            log_format: LogFormat::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let currency = match lookup("CARTWHEEL_CURRENCY") {
            Some(value) => value
                .parse::<CurrencyCode>()
                .map_err(|e| invalid("CARTWHEEL_CURRENCY", e))?,
            None => defaults.currency,
        };

        let shipping_fee = match lookup("CARTWHEEL_SHIPPING_FEE") {
            Some(value) => parse_fee(&value)?,
            None => defaults.shipping_fee,
        };

        let checkout = CheckoutConfig {
            address_save_delay: get_millis(
                &lookup,
                "CARTWHEEL_ADDRESS_SAVE_DELAY_MS",
                defaults.checkout.address_save_delay,
            )?,
            order_delay: get_millis(
                &lookup,
                "CARTWHEEL_CHECKOUT_DELAY_MS",
                defaults.checkout.order_delay,
            )?,
            order_timeout: get_millis(
                &lookup,
                "CARTWHEEL_CHECKOUT_TIMEOUT_MS",
                defaults.checkout.order_timeout,
            )?,
        };
        if checkout.order_timeout.is_zero() {
            return Err(invalid("CARTWHEEL_CHECKOUT_TIMEOUT_MS", "must be greater than 0"));
        }

        let log_format = match lookup("CARTWHEEL_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(invalid(
                    "CARTWHEEL_LOG_FORMAT",
                    format!("expected 'pretty' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            currency,
            shipping_fee,
            checkout,
            log_format,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// Parse a non-negative decimal shipping fee.
fn parse_fee(value: &str) -> Result<Decimal, ConfigError> {
    let fee = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| invalid("CARTWHEEL_SHIPPING_FEE", e))?;
    if fee.is_sign_negative() && !fee.is_zero() {
        return Err(invalid("CARTWHEEL_SHIPPING_FEE", "cannot be negative"));
    }
    Ok(fee)
}

/// Get a millisecond duration with a default value.
fn get_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| invalid(key, e))
    })
}
