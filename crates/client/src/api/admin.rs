//! Admin console endpoint wrappers (staff token required).
//!
//! The backend enforces the staff check; a non-staff token gets a
//! `Forbidden` rejection. These wrappers add nothing beyond the wire
//! calls - role gating for navigation lives in the view layer, which reads
//! `UserProfile::is_staff` off the session.

use haberdash_core::{CategoryId, OrderId, OrderStatus, ProductId, UserId};
use tracing::instrument;

use crate::error::ApiError;
use crate::types::{
    AdminOrderFilter, AdminProductFilter, Category, CategoryInput, Order, OrderStats, Product,
    ProductInput, ProductPatch, ProductStats, UserProfile, UserStats,
};

use super::ApiClient;

impl ApiClient {
    // =========================================================================
    // Products
    // =========================================================================

    /// List products for the admin console, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not staff or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_products(
        &self,
        filter: &AdminProductFilter,
    ) -> Result<Vec<Product>, ApiError> {
        let mut query = Vec::new();
        if let Some(category) = filter.category {
            query.push(("category", category.to_string()));
        }
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }
        self.get_with_query("/admin/products/", &query).await
    }

    /// Get a single product through the admin surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn admin_get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&format!("/admin/products/{id}/")).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure or if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn admin_create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let body = serde_json::to_value(input)?;
        self.post("/admin/products/", &body).await
    }

    /// Replace a product wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure or if the request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn admin_update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let body = serde_json::to_value(input)?;
        self.put(&format!("/admin/products/{id}/"), &body).await
    }

    /// Partially update a product; only the patch's set fields change.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure or if the request fails.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn admin_patch_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let body = serde_json::to_value(patch)?;
        self.patch(&format!("/admin/products/{id}/"), &body).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn admin_delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .delete(&format!("/admin/products/{id}/"), None)
            .await?;
        Ok(())
    }

    /// Product statistics for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_product_stats(&self) -> Result<ProductStats, ApiError> {
        self.get("/admin/products/stats/").await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/admin/categories/").await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure or if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn admin_create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let body = serde_json::to_value(input)?;
        self.post("/admin/categories/", &body).await
    }

    /// Replace a category.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure or if the request fails.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn admin_update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let body = serde_json::to_value(input)?;
        self.put(&format!("/admin/categories/{id}/"), &body).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn admin_delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .delete(&format!("/admin/categories/{id}/"), None)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List every order, optionally filtered by status or user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_orders(&self, filter: AdminOrderFilter) -> Result<Vec<Order>, ApiError> {
        let mut query = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.to_string()));
        }
        if let Some(user) = filter.user {
            query.push(("user", user.to_string()));
        }
        self.get_with_query("/admin/orders/", &query).await
    }

    /// Get any user's order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn admin_get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/admin/orders/{id}/")).await
    }

    /// Request an order status change. The backend validates the status
    /// value and owns the transition.
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid status or if the request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn admin_update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let body = serde_json::json!({ "status": status });
        self.patch(&format!("/admin/orders/{id}/update_status/"), &body)
            .await
    }

    /// Order statistics for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_order_stats(&self) -> Result<OrderStats, ApiError> {
        self.get("/admin/orders/stats/").await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List all user accounts (read-only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.get("/admin/users/").await
    }

    /// Get a single user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn admin_get_user(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.get(&format!("/admin/users/{id}/")).await
    }

    /// User statistics for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_user_stats(&self) -> Result<UserStats, ApiError> {
        self.get("/admin/users/stats/").await
    }
}
