//! Order endpoints.

use tracing::instrument;

use kirana_core::{OrderId, OrderStatus};

use crate::api::ApiGateway;
use crate::error::Result;
use crate::types::{Order, PlaceOrderRequest};

/// Client for `/orders`.
#[derive(Debug, Clone)]
pub struct OrderService {
    gateway: ApiGateway,
}

impl OrderService {
    /// Create the service over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Place an order from the current cart.
    ///
    /// The backend drains the cart into the order; the caller should
    /// refresh its cart view afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the request fails.
    #[instrument(skip(self))]
    pub async fn place(&self, payment_method: &str) -> Result<Order> {
        self.gateway
            .post(
                "orders/create",
                &PlaceOrderRequest {
                    payment_method: payment_method.to_owned(),
                },
            )
            .await
    }

    /// Orders of the logged-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        self.gateway.get("orders/my").await
    }

    /// Get a single order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Order> {
        self.gateway.get(&format!("orders/{id}")).await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// All orders across all users (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Vec<Order>> {
        self.gateway.get("orders").await
    }

    /// Move an order to a new status (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is rejected or the caller is not
    /// an admin.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        self.gateway
            .put_query(
                &format!("orders/{id}/status"),
                &[("status", status.to_string())],
            )
            .await
    }

    /// Delete an order (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<()> {
        self.gateway.delete_empty(&format!("orders/{id}")).await
    }
}
