//! Integration tests for the cart store: the authentication guard, the
//! refetch-after-write policy, and snapshot behavior under failures.
//!
//! Seeded catalog (see `MockShop::spawn`): product 1 at 79.99 with stock
//! 10, product 2 at 450.00 with stock 4, product 3 out of stock.

use std::time::Duration;

use haberdash_client::CartOutcome;
use haberdash_core::{CartLineId, ProductId};
use haberdash_integration_tests::TestContext;
use rust_decimal::Decimal;

fn price(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

/// Poll until `condition` holds or two seconds pass.
async fn wait_for<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within timeout");
}

#[tokio::test]
async fn test_mutation_while_signed_out_sends_nothing() {
    let ctx = TestContext::new().await;

    let outcome = ctx.cart.add_item(ProductId::new(1), 1).await;

    assert_eq!(outcome, CartOutcome::RequiresLogin);
    // Guarded locally: the backend must not have seen any cart traffic.
    assert_eq!(ctx.shop.cart_mutation_count(), 0);
    assert_eq!(ctx.shop.cart_fetch_count(), 0);
}

#[tokio::test]
async fn test_add_item_refetches_the_snapshot() {
    let ctx = TestContext::logged_in().await;

    let outcome = ctx.cart.add_item(ProductId::new(1), 2).await;

    assert!(outcome.is_updated());
    assert_eq!(ctx.shop.cart_mutation_count(), 1);
    assert_eq!(ctx.shop.cart_fetch_count(), 1);

    let snapshot = ctx.cart.snapshot().await.expect("snapshot after write");
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].quantity, 2);
    assert_eq!(snapshot.total_price, price("159.98"));
}

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let ctx = TestContext::logged_in().await;

    assert!(ctx.cart.add_item(ProductId::new(1), 1).await.is_updated());
    assert!(ctx.cart.add_item(ProductId::new(1), 2).await.is_updated());

    let snapshot = ctx.cart.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].quantity, 3);
}

#[tokio::test]
async fn test_item_count_sums_line_quantities() {
    let ctx = TestContext::logged_in().await;

    assert!(ctx.cart.add_item(ProductId::new(1), 2).await.is_updated());
    assert!(ctx.cart.add_item(ProductId::new(2), 1).await.is_updated());

    assert_eq!(ctx.cart.item_count().await, 3);
    assert_eq!(ctx.cart.total_price().await, price("609.98"));
}

#[tokio::test]
async fn test_update_to_zero_removes_the_line() {
    let ctx = TestContext::logged_in().await;
    assert!(ctx.cart.add_item(ProductId::new(1), 2).await.is_updated());
    let line_id = ctx.cart.snapshot().await.expect("snapshot").items[0].id;

    let outcome = ctx.cart.update_item(line_id, 0).await;

    assert!(outcome.is_updated());
    let snapshot = ctx.cart.snapshot().await.expect("snapshot");
    assert!(snapshot.items.is_empty());
    assert_eq!(ctx.cart.item_count().await, 0);
}

#[tokio::test]
async fn test_remove_item() {
    let ctx = TestContext::logged_in().await;
    assert!(ctx.cart.add_item(ProductId::new(1), 1).await.is_updated());
    assert!(ctx.cart.add_item(ProductId::new(2), 1).await.is_updated());
    let line_id = ctx.cart.snapshot().await.expect("snapshot").items[0].id;

    assert!(ctx.cart.remove_item(line_id).await.is_updated());

    let snapshot = ctx.cart.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.items.len(), 1);
}

#[tokio::test]
async fn test_remove_unknown_line_fails_with_message() {
    let ctx = TestContext::logged_in().await;

    let outcome = ctx.cart.remove_item(CartLineId::new(9999)).await;

    assert_eq!(outcome.failure_message(), Some("Cart item not found"));
}

#[tokio::test]
async fn test_clear_empties_the_cart() {
    let ctx = TestContext::logged_in().await;
    assert!(ctx.cart.add_item(ProductId::new(1), 2).await.is_updated());

    assert!(ctx.cart.clear().await.is_updated());

    let snapshot = ctx.cart.snapshot().await.expect("snapshot");
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.total_price, Decimal::ZERO);
}

#[tokio::test]
async fn test_insufficient_stock_surfaces_backend_message() {
    let ctx = TestContext::logged_in().await;

    let outcome = ctx.cart.add_item(ProductId::new(3), 1).await;

    assert_eq!(
        outcome.failure_message(),
        Some("Insufficient stock. Only 0 items available")
    );
    // A failed mutation still resyncs the mirror.
    assert_eq!(ctx.shop.cart_fetch_count(), 1);
}

#[tokio::test]
async fn test_failed_refetch_keeps_the_stale_snapshot() {
    let ctx = TestContext::logged_in().await;
    assert!(ctx.cart.add_item(ProductId::new(1), 2).await.is_updated());
    let before = ctx.cart.snapshot().await.expect("snapshot");

    ctx.shop.set_cart_fetch_fails(true);
    ctx.cart.refresh().await;

    // Stale beats empty mid-session.
    assert_eq!(ctx.cart.snapshot().await, Some(before));
}

#[tokio::test]
async fn test_auth_watcher_exits_once_the_stores_are_dropped() {
    let ctx = TestContext::new().await;
    let watcher = ctx.cart.spawn_auth_watcher();

    let TestContext { shop, api, tokens, session, cart } = ctx;
    drop(cart);
    drop(session);
    drop(api);
    drop(tokens);

    // The watcher must not pin the stores alive; with every other handle
    // gone it has to finish on its own.
    tokio::time::timeout(Duration::from_secs(2), watcher)
        .await
        .expect("watcher exits after the stores are dropped")
        .expect("watcher task finishes cleanly");
    drop(shop);
}

#[tokio::test]
async fn test_auth_watcher_fetches_on_login_and_clears_on_logout() {
    let ctx = TestContext::new().await;
    ctx.shop.seed_user("alice", "hunter2", false);
    let _watcher = ctx.cart.spawn_auth_watcher();

    ctx.session
        .login(&haberdash_client::types::Credentials::new("alice", "hunter2"))
        .await
        .expect("login");
    wait_for(|| async { ctx.cart.snapshot().await.is_some() }).await;

    ctx.session.logout().await;
    wait_for(|| async { ctx.cart.snapshot().await.is_none() }).await;
}
