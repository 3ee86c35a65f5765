//! Business logic services for storefront.
//!
//! # Services
//!
//! - `reconciler` - Cart and wishlist ownership rules
//! - `checkout` - Order summary, address saving and order placement
//! - `gateway` - Backend boundary for checkout (simulated)
//! - `notify` - User-visible notices

pub mod checkout;
pub mod gateway;
pub mod notify;
pub mod reconciler;

pub use checkout::{CheckoutError, CheckoutService, CheckoutSummary};
pub use gateway::{CheckoutGateway, GatewayError, SimulatedGateway};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
