//! Product and category endpoint wrappers (public, unauthenticated reads).

use haberdash_core::{CategoryId, ProductId};
use tracing::instrument;

use crate::error::ApiError;
use crate::types::{Category, Product, ProductFilter};

use super::ApiClient;

impl ApiClient {
    /// List products, optionally filtered by category or featured flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, ApiError> {
        let mut query = Vec::new();
        if let Some(category) = filter.category {
            query.push(("category", category.to_string()));
        }
        if filter.featured {
            query.push(("featured", "true".to_owned()));
        }
        self.get_with_query("/products/", &query).await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&format!("/products/{id}/")).await
    }

    /// List the featured products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products/featured/").await
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/categories/").await
    }

    /// Get a single category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.get(&format!("/categories/{id}/")).await
    }

    /// Fetch the landing-page content: categories and featured products.
    ///
    /// The two reads are independent, so they run concurrently. This is the
    /// only internally parallel operation in the client.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    #[instrument(skip(self))]
    pub async fn home_content(&self) -> Result<(Vec<Category>, Vec<Product>), ApiError> {
        tokio::try_join!(self.list_categories(), self.featured_products())
    }
}
