//! Staff-only management commands.
//!
//! The session's `is_staff` flag gates these locally for a friendlier
//! error; the backend re-checks the token on every call regardless.

use clap::Subcommand;
use rust_decimal::Decimal;

use haberdash_client::types::{
    AdminOrderFilter, AdminProductFilter, CategoryInput, ProductInput, ProductPatch,
};
use haberdash_client::{ApiClient, SessionStore};
use haberdash_core::{CategoryId, OrderId, OrderStatus, ProductId};

use super::CliError;

#[derive(Subcommand)]
pub enum AdminAction {
    /// List products with admin filters
    Products {
        /// Only products in this category
        #[arg(long)]
        category: Option<CategoryId>,

        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a product
    CreateProduct {
        /// Product name
        #[arg(long)]
        name: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Owning category ID
        #[arg(long)]
        category: CategoryId,

        /// Units in stock
        #[arg(long, default_value_t = 0)]
        stock: i64,

        /// Garment size
        #[arg(long)]
        size: Option<String>,

        /// Brand name
        #[arg(long)]
        brand: Option<String>,

        /// Feature on the landing page
        #[arg(long)]
        featured: bool,
    },
    /// Set a product's stock level
    SetStock {
        /// Product ID
        id: ProductId,

        /// New stock level
        stock: i64,
    },
    /// Delete a product
    DeleteProduct {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
    /// Create a category
    CreateCategory {
        /// Category name
        #[arg(long)]
        name: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a category
    DeleteCategory {
        /// Category ID
        id: CategoryId,
    },
    /// List all orders
    Orders {
        /// Only orders with this status
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Change an order's status
    SetOrderStatus {
        /// Order ID
        id: OrderId,

        /// New status (pending, processing, shipped, delivered, cancelled)
        status: OrderStatus,
    },
    /// List user accounts
    Users,
    /// Product statistics
    ProductStats,
    /// Order statistics
    OrderStats,
    /// User statistics
    UserStats,
}

pub async fn run(
    action: AdminAction,
    api: &ApiClient,
    session: &SessionStore,
) -> Result<(), CliError> {
    if !session.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    if !session.is_staff().await {
        return Err(CliError::NotStaff);
    }

    match action {
        AdminAction::Products { category, search } => {
            let products = api
                .admin_list_products(&AdminProductFilter { category, search })
                .await?;
            for product in &products {
                tracing::info!(
                    "  [{}] {} - {} ({} in stock{})",
                    product.id,
                    product.name,
                    product.price,
                    product.stock,
                    if product.is_featured { ", featured" } else { "" }
                );
            }
        }
        AdminAction::CreateProduct {
            name,
            description,
            price,
            category,
            stock,
            size,
            brand,
            featured,
        } => {
            let product = api
                .admin_create_product(&ProductInput {
                    name,
                    description,
                    price,
                    category,
                    image_url: None,
                    stock,
                    size,
                    brand,
                    is_featured: featured,
                })
                .await?;
            tracing::info!("Created product [{}] {}", product.id, product.name);
        }
        AdminAction::SetStock { id, stock } => {
            let product = api
                .admin_patch_product(
                    id,
                    &ProductPatch {
                        stock: Some(stock),
                        ..ProductPatch::default()
                    },
                )
                .await?;
            tracing::info!("{} now has {} in stock", product.name, product.stock);
        }
        AdminAction::DeleteProduct { id } => {
            api.admin_delete_product(id).await?;
            tracing::info!("Deleted product {id}");
        }
        AdminAction::Categories => {
            let categories = api.admin_list_categories().await?;
            for category in &categories {
                tracing::info!("  [{}] {}", category.id, category.name);
            }
        }
        AdminAction::CreateCategory { name, description } => {
            let category = api
                .admin_create_category(&CategoryInput { name, description })
                .await?;
            tracing::info!("Created category [{}] {}", category.id, category.name);
        }
        AdminAction::DeleteCategory { id } => {
            api.admin_delete_category(id).await?;
            tracing::info!("Deleted category {id}");
        }
        AdminAction::Orders { status } => {
            let orders = api
                .admin_list_orders(AdminOrderFilter { status, user: None })
                .await?;
            for order in &orders {
                tracing::info!(
                    "  [{}] {} by {} - {} ({})",
                    order.id,
                    order.status,
                    order.user_name,
                    order.total_amount,
                    order
                        .created_at
                        .map_or_else(|| "-".to_owned(), |at| at.to_rfc3339())
                );
            }
        }
        AdminAction::SetOrderStatus { id, status } => {
            let order = api.admin_update_order_status(id, status).await?;
            tracing::info!("Order {} is now {}", order.id, order.status);
        }
        AdminAction::Users => {
            let users = api.admin_list_users().await?;
            for user in &users {
                tracing::info!(
                    "  [{}] {} <{}>{}",
                    user.id,
                    user.username,
                    user.email,
                    if user.is_staff { " (staff)" } else { "" }
                );
            }
        }
        AdminAction::ProductStats => {
            let stats = api.admin_product_stats().await?;
            tracing::info!("products: {}", stats.total_products);
            tracing::info!("low stock: {}", stats.low_stock);
            tracing::info!("out of stock: {}", stats.out_of_stock);
            tracing::info!("featured: {}", stats.featured_products);
        }
        AdminAction::OrderStats => {
            let stats = api.admin_order_stats().await?;
            tracing::info!("orders: {}", stats.total_orders);
            tracing::info!("pending: {}", stats.pending_orders);
            tracing::info!("processing: {}", stats.processing_orders);
            tracing::info!("completed: {}", stats.completed_orders);
            tracing::info!("revenue: {:.2}", stats.total_revenue);
        }
        AdminAction::UserStats => {
            let stats = api.admin_user_stats().await?;
            tracing::info!("users: {}", stats.total_users);
            tracing::info!("staff: {}", stats.admin_users);
            tracing::info!("active: {}", stats.active_users);
            tracing::info!("regular: {}", stats.regular_users);
        }
    }
    Ok(())
}
