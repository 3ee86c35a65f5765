//! Order placement types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cartwheel_core::{OrderId, Price, UserId};

use super::CartLineItem;

/// An order submitted to the order gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Fresh per checkout attempt; the gateway deduplicates on it.
    pub idempotency_key: Uuid,
    /// Ordering user, `None` for guest checkout.
    pub user_id: Option<UserId>,
    pub items: Vec<CartLineItem>,
    pub shipping_address: String,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
    pub order_date: DateTime<Utc>,
}

/// Gateway acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub idempotency_key: Uuid,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}
