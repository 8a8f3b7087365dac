//! Domain types for the Haberdash backend API.
//!
//! These mirror the backend's serialized shapes. Monetary fields arrive as
//! string-encoded decimals and are parsed into `rust_decimal::Decimal`;
//! every price, subtotal, and total here is server-computed and trusted,
//! never recomputed client-side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use haberdash_core::{
    CartId, CartLineId, CategoryId, OrderId, OrderLineId, OrderStatus, ProductId, UserId,
};

// =============================================================================
// User Types
// =============================================================================

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Whether this user may use the admin surface.
    #[serde(default)]
    pub is_staff: bool,
}

/// Login credentials.
///
/// The password is wrapped in `SecretString` so it never lands in debug
/// output; it is exposed only while building the request body.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from plain strings.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Registration payload for a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Desired login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: SecretString,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

/// A product in the store.
///
/// Read-only projection owned by the backend; this layer never mutates it
/// directly, only through cart operations referencing the product ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Owning category.
    pub category: CategoryId,
    /// Denormalized category name.
    #[serde(default)]
    pub category_name: String,
    /// Image URL.
    pub image_url: Option<String>,
    /// Units in stock.
    pub stock: i64,
    /// Garment size (e.g. "M", "42R").
    pub size: Option<String>,
    /// Brand name.
    pub brand: Option<String>,
    /// Whether the product is featured on the landing page.
    #[serde(default)]
    pub is_featured: bool,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filters for the public product listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    /// Only products in this category.
    pub category: Option<CategoryId>,
    /// Only featured products.
    pub featured: bool,
}

// =============================================================================
// Cart Types
// =============================================================================

/// One product+quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID.
    pub id: CartLineId,
    /// The product on this line.
    pub product: Product,
    /// Quantity (always positive; the backend deletes lines at zero).
    pub quantity: u32,
    /// Server-computed `price * quantity`.
    pub subtotal: Decimal,
    /// When the line was added.
    pub added_at: Option<DateTime<Utc>>,
}

/// The locally cached copy of the server-side cart.
///
/// Replaced wholesale on every fetch, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Cart ID.
    pub id: CartId,
    /// Owning user.
    pub user: UserId,
    /// Cart lines, in server order.
    pub items: Vec<CartLine>,
    /// Server-computed total.
    pub total_price: Decimal,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Order Types
// =============================================================================

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Order line ID.
    pub id: OrderLineId,
    /// Ordered product.
    pub product: ProductId,
    /// Denormalized product name.
    #[serde(default)]
    pub product_name: String,
    /// Denormalized product image.
    pub product_image: Option<String>,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price at order time.
    pub price: Decimal,
    /// Server-computed line subtotal.
    pub subtotal: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Owning user.
    pub user: UserId,
    /// Denormalized username.
    #[serde(default)]
    pub user_name: String,
    /// Server-computed order total.
    pub total_amount: Decimal,
    /// Order lifecycle status.
    pub status: OrderStatus,
    /// Shipping address.
    pub shipping_address: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Order lines.
    #[serde(default)]
    pub items: Vec<OrderLine>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for placing an order from the current cart.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    /// Shipping address.
    pub shipping_address: String,
    /// Contact phone number.
    pub phone_number: String,
}

// =============================================================================
// Admin Types
// =============================================================================

/// Input for creating or fully replacing a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    /// Product name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Owning category.
    pub category: CategoryId,
    /// Image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Units in stock.
    pub stock: i64,
    /// Garment size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Brand name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Whether featured on the landing page.
    pub is_featured: bool,
}

/// Partial update for a product; only the set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

/// Input for creating or replacing a category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    /// Category name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// Filters for the admin product listing.
#[derive(Debug, Clone, Default)]
pub struct AdminProductFilter {
    /// Only products in this category.
    pub category: Option<CategoryId>,
    /// Case-insensitive name search.
    pub search: Option<String>,
}

/// Filters for the admin order listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOrderFilter {
    /// Only orders with this status.
    pub status: Option<OrderStatus>,
    /// Only orders from this user.
    pub user: Option<UserId>,
}

/// Product statistics for the admin dashboard.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProductStats {
    pub total_products: i64,
    pub low_stock: i64,
    pub out_of_stock: i64,
    pub featured_products: i64,
}

/// Order statistics for the admin dashboard.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub processing_orders: i64,
    pub completed_orders: i64,
    pub total_revenue: f64,
}

/// User statistics for the admin dashboard.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub active_users: i64,
    pub regular_users: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_snapshot_wire_format() {
        let payload = r#"{
            "id": 1,
            "user": 4,
            "items": [{
                "id": 12,
                "product": {
                    "id": 7,
                    "name": "Oxford Shirt",
                    "description": "Slim fit",
                    "price": "79.99",
                    "category": 2,
                    "category_name": "Shirts",
                    "image_url": null,
                    "stock": 14,
                    "size": "M",
                    "brand": "Harwell",
                    "is_featured": true,
                    "created_at": "2026-03-01T09:30:00Z",
                    "updated_at": "2026-03-02T09:30:00Z"
                },
                "quantity": 2,
                "subtotal": "159.98",
                "added_at": "2026-03-05T10:00:00Z"
            }],
            "total_price": "159.98",
            "created_at": "2026-03-01T09:00:00Z",
            "updated_at": "2026-03-05T10:00:00Z"
        }"#;

        let cart: CartSnapshot = serde_json::from_str(payload).unwrap();
        assert_eq!(cart.items.len(), 1);
        let line = &cart.items[0];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.subtotal, "159.98".parse::<Decimal>().unwrap());
        assert_eq!(cart.total_price, "159.98".parse::<Decimal>().unwrap());
        assert_eq!(line.product.name, "Oxford Shirt");
    }

    #[test]
    fn test_user_profile_defaults_is_staff() {
        let payload = r#"{"id": 1, "username": "u", "email": "u@example.com",
                          "first_name": "U", "last_name": "Ser"}"#;
        let user: UserProfile = serde_json::from_str(payload).unwrap();
        assert!(!user.is_staff);
    }

    #[test]
    fn test_order_wire_format() {
        let payload = r#"{
            "id": 3,
            "user": 4,
            "user_name": "u",
            "total_amount": "240.50",
            "status": "processing",
            "shipping_address": "1 Savile Row",
            "phone_number": "5550100",
            "items": [],
            "created_at": "2026-03-06T08:00:00Z",
            "updated_at": "2026-03-06T08:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(payload).unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total_amount, "240.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_product_patch_skips_unset_fields() {
        let patch = ProductPatch {
            stock: Some(3),
            ..ProductPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"stock": 3}));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("u", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
