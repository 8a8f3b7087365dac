//! Order endpoint wrappers.

use haberdash_core::OrderId;
use tracing::instrument;

use crate::error::ApiError;
use crate::types::{NewOrder, Order};

use super::ApiClient;

impl ApiClient {
    /// List the authenticated user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders/").await
    }

    /// Get one of the authenticated user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{id}/")).await
    }

    /// Place an order from the current cart contents.
    ///
    /// On success the backend empties the cart; the cart store's next
    /// refresh reflects that.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, stock is insufficient, or the
    /// request fails.
    #[instrument(skip(self, order))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let body = serde_json::to_value(order)?;
        self.post("/orders/", &body).await
    }
}
