//! Cart endpoint wrappers.
//!
//! These are the raw wire operations. The [`crate::cart::CartStore`] layers
//! the authentication guard and refetch-after-write policy on top; prefer
//! it over calling these directly.

use haberdash_core::{CartLineId, ProductId};
use tracing::instrument;

use crate::error::ApiError;
use crate::types::CartSnapshot;

use super::ApiClient;

impl ApiClient {
    /// Fetch the authenticated user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is not
    /// authenticated.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<CartSnapshot, ApiError> {
        self.get("/cart/").await
    }

    /// Add a product to the cart. Adding a product already in the cart
    /// increments that line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error on insufficient stock, unknown product, or request
    /// failure.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn add_cart_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "product_id": product_id,
            "quantity": quantity,
        });
        let _: serde_json::Value = self.post("/cart/add_item/", &body).await?;
        Ok(())
    }

    /// Set a cart line's quantity. The backend removes the line when the
    /// quantity drops to zero.
    ///
    /// # Errors
    ///
    /// Returns an error on insufficient stock, unknown line, or request
    /// failure.
    #[instrument(skip(self), fields(line_id = %line_id, quantity))]
    pub async fn update_cart_item(&self, line_id: CartLineId, quantity: u32) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "cart_item_id": line_id,
            "quantity": quantity,
        });
        let _: serde_json::Value = self.patch("/cart/update_item/", &body).await?;
        Ok(())
    }

    /// Remove a cart line. The line identifier travels in the request body,
    /// not the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_cart_item(&self, line_id: CartLineId) -> Result<(), ApiError> {
        let body = serde_json::json!({ "cart_item_id": line_id });
        let _: serde_json::Value = self.delete("/cart/remove_item/", Some(&body)).await?;
        Ok(())
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.delete("/cart/clear/", None).await?;
        Ok(())
    }
}
