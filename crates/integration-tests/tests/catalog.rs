//! Integration tests for the public catalog endpoints. No login required.

use haberdash_client::types::ProductFilter;
use haberdash_client::{ApiError, RejectionKind};
use haberdash_core::{CategoryId, ProductId};
use haberdash_integration_tests::TestContext;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_list_products_unfiltered() {
    let ctx = TestContext::new().await;

    let products = ctx
        .api
        .list_products(ProductFilter::default())
        .await
        .expect("list products");

    assert_eq!(products.len(), 3);
    assert_eq!(products[0].price, "79.99".parse::<Decimal>().expect("decimal"));
}

#[tokio::test]
async fn test_list_products_by_category() {
    let ctx = TestContext::new().await;

    let products = ctx
        .api
        .list_products(ProductFilter {
            category: Some(CategoryId::new(2)),
            featured: false,
        })
        .await
        .expect("list products");

    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p.category == CategoryId::new(2)));
}

#[tokio::test]
async fn test_featured_products() {
    let ctx = TestContext::new().await;

    let products = ctx.api.featured_products().await.expect("featured");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Oxford Shirt");
    assert!(products[0].is_featured);
}

#[tokio::test]
async fn test_home_content_fetches_both_halves() {
    let ctx = TestContext::new().await;

    let (categories, featured) = ctx.api.home_content().await.expect("home content");

    assert_eq!(categories.len(), 2);
    assert_eq!(featured.len(), 1);
}

#[tokio::test]
async fn test_get_unknown_product_is_not_found() {
    let ctx = TestContext::new().await;

    let err = ctx
        .api
        .get_product(ProductId::new(999))
        .await
        .expect_err("unknown product");

    assert!(matches!(
        err,
        ApiError::Rejected(ref rejection) if rejection.kind == RejectionKind::NotFound
    ));
}

#[tokio::test]
async fn test_get_category() {
    let ctx = TestContext::new().await;

    let category = ctx
        .api
        .get_category(CategoryId::new(1))
        .await
        .expect("get category");

    assert_eq!(category.name, "Shirts");
}
