//! Integration tests for the staff-only admin surface: role gating,
//! product and category management, order transitions, and dashboards.

use haberdash_client::types::{
    AdminOrderFilter, AdminProductFilter, CategoryInput, NewOrder, ProductInput, ProductPatch,
};
use haberdash_client::{ApiError, RejectionKind};
use haberdash_core::{CategoryId, OrderStatus, ProductId};
use haberdash_integration_tests::TestContext;
use rust_decimal::Decimal;

fn forbidden(err: &ApiError) -> bool {
    matches!(
        err,
        ApiError::Rejected(rejection) if rejection.kind == RejectionKind::Forbidden
    )
}

fn sample_product() -> ProductInput {
    ProductInput {
        name: "Linen Blazer".to_owned(),
        description: "Unstructured, half-lined".to_owned(),
        price: "295.00".parse().expect("decimal"),
        category: CategoryId::new(2),
        image_url: None,
        stock: 6,
        size: Some("40R".to_owned()),
        brand: Some("Harwell".to_owned()),
        is_featured: false,
    }
}

#[tokio::test]
async fn test_non_staff_token_is_forbidden() {
    let ctx = TestContext::logged_in().await;

    let err = ctx
        .api
        .admin_product_stats()
        .await
        .expect_err("non-staff must be rejected");

    assert!(forbidden(&err));
}

#[tokio::test]
async fn test_unauthenticated_admin_call_is_unauthorized() {
    let ctx = TestContext::new().await;

    let err = ctx
        .api
        .admin_list_users()
        .await
        .expect_err("anonymous must be rejected");

    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_product_create_patch_delete() {
    let ctx = TestContext::staff().await;

    let created = ctx
        .api
        .admin_create_product(&sample_product())
        .await
        .expect("create product");
    assert_eq!(created.name, "Linen Blazer");
    assert_eq!(created.stock, 6);

    let patched = ctx
        .api
        .admin_patch_product(
            created.id,
            &ProductPatch {
                stock: Some(2),
                ..ProductPatch::default()
            },
        )
        .await
        .expect("patch product");
    assert_eq!(patched.stock, 2);
    // Untouched fields survive a partial update.
    assert_eq!(patched.name, "Linen Blazer");
    assert_eq!(patched.price, "295.00".parse::<Decimal>().expect("decimal"));

    ctx.api
        .admin_delete_product(created.id)
        .await
        .expect("delete product");
    let err = ctx
        .api
        .admin_get_product(created.id)
        .await
        .expect_err("deleted product is gone");
    assert!(matches!(
        err,
        ApiError::Rejected(ref rejection) if rejection.kind == RejectionKind::NotFound
    ));
}

#[tokio::test]
async fn test_product_replace_overwrites_every_field() {
    let ctx = TestContext::staff().await;
    let created = ctx
        .api
        .admin_create_product(&sample_product())
        .await
        .expect("create product");

    let mut replacement = sample_product();
    replacement.name = "Linen Blazer Mk II".to_owned();
    replacement.price = "310.00".parse().expect("decimal");
    replacement.stock = 12;

    let replaced = ctx
        .api
        .admin_update_product(created.id, &replacement)
        .await
        .expect("replace product");

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.name, "Linen Blazer Mk II");
    assert_eq!(replaced.price, "310.00".parse::<Decimal>().expect("decimal"));
    assert_eq!(replaced.stock, 12);
}

#[tokio::test]
async fn test_product_search_filter() {
    let ctx = TestContext::staff().await;

    let hits = ctx
        .api
        .admin_list_products(&AdminProductFilter {
            category: None,
            search: Some("oxford".to_owned()),
        })
        .await
        .expect("search products");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Oxford Shirt");
}

#[tokio::test]
async fn test_category_management() {
    let ctx = TestContext::staff().await;

    let created = ctx
        .api
        .admin_create_category(&CategoryInput {
            name: "Outerwear".to_owned(),
            description: String::new(),
        })
        .await
        .expect("create category");

    let all = ctx.api.admin_list_categories().await.expect("list categories");
    assert!(all.iter().any(|c| c.id == created.id));

    let renamed = ctx
        .api
        .admin_update_category(
            created.id,
            &CategoryInput {
                name: "Coats & Outerwear".to_owned(),
                description: String::new(),
            },
        )
        .await
        .expect("rename category");
    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.name, "Coats & Outerwear");

    ctx.api
        .admin_delete_category(created.id)
        .await
        .expect("delete category");
    let all = ctx.api.admin_list_categories().await.expect("list categories");
    assert!(!all.iter().any(|c| c.id == created.id));
}

#[tokio::test]
async fn test_order_status_transition_and_filter() {
    let ctx = TestContext::staff().await;
    assert!(ctx.cart.add_item(ProductId::new(1), 1).await.is_updated());
    let placed = ctx
        .api
        .create_order(&NewOrder {
            shipping_address: "1 Savile Row".to_owned(),
            phone_number: "5550100".to_owned(),
        })
        .await
        .expect("place order");

    let updated = ctx
        .api
        .admin_update_order_status(placed.id, OrderStatus::Processing)
        .await
        .expect("update status");
    assert_eq!(updated.status, OrderStatus::Processing);

    // The change is visible through the admin order lookup too.
    let fetched = ctx
        .api
        .admin_get_order(placed.id)
        .await
        .expect("get order as staff");
    assert_eq!(fetched.status, OrderStatus::Processing);

    let processing = ctx
        .api
        .admin_list_orders(AdminOrderFilter {
            status: Some(OrderStatus::Processing),
            user: None,
        })
        .await
        .expect("filter orders");
    assert_eq!(processing.len(), 1);

    let pending = ctx
        .api
        .admin_list_orders(AdminOrderFilter {
            status: Some(OrderStatus::Pending),
            user: None,
        })
        .await
        .expect("filter orders");
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_user_listing_and_lookup() {
    let ctx = TestContext::staff().await;
    ctx.shop.seed_user("alice", "hunter2", false);

    let users = ctx.api.admin_list_users().await.expect("list users");
    assert_eq!(users.len(), 2);

    let staff = users.iter().find(|u| u.is_staff).expect("staff account listed");
    let fetched = ctx.api.admin_get_user(staff.id).await.expect("get user");
    assert_eq!(fetched.username, "quinn");
    assert!(fetched.is_staff);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let ctx = TestContext::staff().await;
    assert!(ctx.cart.add_item(ProductId::new(2), 1).await.is_updated());
    ctx.api
        .create_order(&NewOrder {
            shipping_address: "1 Savile Row".to_owned(),
            phone_number: "5550100".to_owned(),
        })
        .await
        .expect("place order");

    let products = ctx.api.admin_product_stats().await.expect("product stats");
    assert_eq!(products.total_products, 3);
    assert_eq!(products.out_of_stock, 1);
    assert_eq!(products.featured_products, 1);

    let orders = ctx.api.admin_order_stats().await.expect("order stats");
    assert_eq!(orders.total_orders, 1);
    assert_eq!(orders.pending_orders, 1);
    assert!((orders.total_revenue - 450.0).abs() < f64::EPSILON);

    let users = ctx.api.admin_user_stats().await.expect("user stats");
    assert_eq!(users.total_users, 1);
    assert_eq!(users.admin_users, 1);
    assert_eq!(users.regular_users, 0);
}
