//! Catalog browsing commands (no login required).

use clap::Subcommand;

use haberdash_client::ApiClient;
use haberdash_client::types::{Product, ProductFilter};
use haberdash_core::{CategoryId, ProductId};

use super::CliError;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products
    Products {
        /// Only products in this category
        #[arg(long)]
        category: Option<CategoryId>,

        /// Only featured products
        #[arg(long)]
        featured: bool,
    },
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
    /// Show the landing-page content (categories + featured products)
    Home,
}

pub async fn run(action: CatalogAction, api: &ApiClient) -> Result<(), CliError> {
    match action {
        CatalogAction::Products { category, featured } => {
            let products = api.list_products(ProductFilter { category, featured }).await?;
            tracing::info!("{} product(s)", products.len());
            for product in &products {
                print_product_line(product);
            }
        }
        CatalogAction::Product { id } => {
            let product = api.get_product(id).await?;
            tracing::info!("{} - {}", product.name, product.price);
            tracing::info!("  category: {}", product.category_name);
            tracing::info!("  stock: {}", product.stock);
            if let Some(brand) = &product.brand {
                tracing::info!("  brand: {brand}");
            }
            if let Some(size) = &product.size {
                tracing::info!("  size: {size}");
            }
            if !product.description.is_empty() {
                tracing::info!("  {}", product.description);
            }
        }
        CatalogAction::Categories => {
            let categories = api.list_categories().await?;
            for category in &categories {
                tracing::info!("[{}] {}", category.id, category.name);
            }
        }
        CatalogAction::Home => {
            let (categories, featured) = api.home_content().await?;
            tracing::info!("Categories:");
            for category in &categories {
                tracing::info!("  [{}] {}", category.id, category.name);
            }
            tracing::info!("Featured:");
            for product in &featured {
                print_product_line(product);
            }
        }
    }
    Ok(())
}

fn print_product_line(product: &Product) {
    tracing::info!(
        "  [{}] {} - {} ({} in stock)",
        product.id,
        product.name,
        product.price,
        product.stock
    );
}
