//! Checkout gateway: the boundary to a future order/account backend.
//!
//! There is no backend yet. [`SimulatedGateway`] stands in for it with fixed
//! delays and always succeeds, so the error paths of the checkout flow are
//! exercised through test gateways instead.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use cartwheel_core::{OrderId, UserId};

use crate::config::CheckoutConfig;
use crate::models::{OrderConfirmation, OrderRequest};

/// Errors returned by a checkout gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// No answer within the allotted time.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Backend operations needed by the checkout flow.
pub trait CheckoutGateway: Send + Sync {
    /// Persist a user's shipping address.
    fn save_address(
        &self,
        user_id: &UserId,
        address: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Place an order.
    ///
    /// Submitting the same `idempotency_key` twice must not create a
    /// second order.
    fn submit_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, GatewayError>> + Send;
}

/// In-process gateway with artificial latency.
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    address_delay: Duration,
    order_delay: Duration,
    placed: Mutex<HashMap<Uuid, OrderConfirmation>>,
}

impl SimulatedGateway {
    #[must_use]
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            address_delay: config.address_save_delay,
            order_delay: config.order_delay,
            placed: Mutex::default(),
        }
    }

    /// Gateway that answers immediately.
    #[must_use]
    pub fn instant() -> Self {
        Self::default()
    }

    /// Number of distinct orders placed so far.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl CheckoutGateway for SimulatedGateway {
    #[instrument(skip(self, address), fields(user_id = %user_id))]
    async fn save_address(&self, user_id: &UserId, address: &str) -> Result<(), GatewayError> {
        tokio::time::sleep(self.address_delay).await;
        info!(len = address.len(), "Address saved");
        Ok(())
    }

    #[instrument(skip(self, order), fields(idempotency_key = %order.idempotency_key))]
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        tokio::time::sleep(self.order_delay).await;

        let mut placed = self.placed.lock().unwrap_or_else(PoisonError::into_inner);
        let confirmation = placed
            .entry(order.idempotency_key)
            .or_insert_with(|| OrderConfirmation {
                order_id: OrderId::new(format!("ord_{}", Uuid::new_v4().simple())),
                idempotency_key: order.idempotency_key,
                total: order.total,
                placed_at: Utc::now(),
            })
            .clone();
        drop(placed);

        info!(order_id = %confirmation.order_id, total = %confirmation.total, "Order created");
        Ok(confirmation)
    }
}
