//! Cart endpoints.
//!
//! Never cached: every response is a fresh server snapshot, and the cart
//! synchronizer replaces its state with each one wholesale.

use tracing::instrument;

use kirana_core::ProductId;

use crate::api::ApiGateway;
use crate::cart::CartApi;
use crate::error::Result;
use crate::types::{Cart, CartRequest};

/// Client for `/cart`.
#[derive(Debug, Clone)]
pub struct CartService {
    gateway: ApiGateway,
}

impl CartService {
    /// Create the service over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }
}

impl CartApi for CartService {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Cart> {
        self.gateway.get("cart").await
    }

    #[instrument(skip(self))]
    async fn add_item(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
        self.gateway
            .post(
                "cart/add",
                &CartRequest {
                    product_id,
                    quantity: Some(quantity),
                },
            )
            .await
    }

    #[instrument(skip(self))]
    async fn update_item(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
        self.gateway
            .put(
                "cart/update",
                &CartRequest {
                    product_id,
                    quantity: Some(quantity),
                },
            )
            .await
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, product_id: ProductId) -> Result<Cart> {
        self.gateway
            .delete_with_body(
                "cart/remove",
                &CartRequest {
                    product_id,
                    quantity: None,
                },
            )
            .await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<()> {
        // The endpoint answers with a confirmation string, not a cart
        self.gateway.delete_text("cart/clear").await.map(|_| ())
    }
}
