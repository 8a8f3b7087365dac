//! Integration tests for the session store: startup restore, login,
//! registration, and logout against the mock backend.

use haberdash_client::types::{Credentials, Registration};
use haberdash_client::{ApiError, RejectionKind, TokenStore};
use haberdash_integration_tests::TestContext;

#[tokio::test]
async fn test_initialize_without_token_stays_signed_out() {
    let ctx = TestContext::new().await;
    ctx.session.initialize().await;

    assert!(!ctx.session.is_authenticated());
    assert!(ctx.session.current_user().await.is_none());
}

#[tokio::test]
async fn test_initialize_restores_session_from_valid_token() {
    let ctx = TestContext::new().await;
    ctx.shop.seed_user("alice", "hunter2", false);
    let token = ctx.shop.issue_token("alice");
    ctx.tokens.save(&token).expect("seed token store");

    ctx.session.initialize().await;

    assert!(ctx.session.is_authenticated());
    let user = ctx.session.current_user().await.expect("restored user");
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_initialize_discards_rejected_token() {
    let ctx = TestContext::new().await;
    ctx.tokens.save("tok-bogus").expect("seed token store");

    ctx.session.initialize().await;

    assert!(!ctx.session.is_authenticated());
    // The dead token must not survive to the next startup.
    assert!(ctx.tokens.load().expect("token store readable").is_none());
    assert!(!ctx.api.has_token());
}

#[tokio::test]
async fn test_login_persists_token_and_caches_user() {
    let ctx = TestContext::new().await;
    ctx.shop.seed_user("alice", "hunter2", false);

    let user = ctx
        .session
        .login(&Credentials::new("alice", "hunter2"))
        .await
        .expect("login");

    assert_eq!(user.username, "alice");
    assert!(ctx.session.is_authenticated());
    let stored = ctx.tokens.load().expect("token store readable").expect("persisted token");
    assert!(ctx.shop.token_is_valid(&stored));
}

#[tokio::test]
async fn test_login_failure_changes_nothing() {
    let ctx = TestContext::new().await;
    ctx.shop.seed_user("alice", "hunter2", false);

    let err = ctx
        .session
        .login(&Credentials::new("alice", "wrong"))
        .await
        .expect_err("bad password must fail");

    assert_eq!(err.user_message(), "Invalid username or password");
    assert!(!ctx.session.is_authenticated());
    assert!(ctx.tokens.load().expect("token store readable").is_none());
}

#[tokio::test]
async fn test_register_is_also_a_login() {
    let ctx = TestContext::new().await;

    let user = ctx
        .session
        .register(&Registration {
            username: "bob".to_owned(),
            email: "bob@example.com".to_owned(),
            password: "pass1234".to_owned().into(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .await
        .expect("register");

    assert_eq!(user.username, "bob");
    assert!(ctx.session.is_authenticated());
    assert!(ctx.tokens.load().expect("token store readable").is_some());
}

#[tokio::test]
async fn test_register_duplicate_username_reports_field_errors() {
    let ctx = TestContext::new().await;
    ctx.shop.seed_user("bob", "pass1234", false);

    let err = ctx
        .session
        .register(&Registration {
            username: "bob".to_owned(),
            email: "bob2@example.com".to_owned(),
            password: "pass1234".to_owned().into(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .await
        .expect_err("duplicate username must fail");

    let fields = err.field_errors().expect("field-keyed validation errors");
    assert!(fields.contains_key("username"));
    assert!(!ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_logout_invalidates_the_server_token() {
    let ctx = TestContext::logged_in().await;
    let token = ctx
        .tokens
        .load()
        .expect("token store readable")
        .expect("persisted token");

    ctx.session.logout().await;

    assert!(!ctx.shop.token_is_valid(&token));
    assert_eq!(ctx.shop.logout_call_count(), 1);
}

#[tokio::test]
async fn test_logout_clears_local_state_even_when_server_fails() {
    let ctx = TestContext::logged_in().await;
    ctx.shop.set_logout_fails(true);

    ctx.session.logout().await;

    assert!(!ctx.session.is_authenticated());
    assert!(ctx.session.current_user().await.is_none());
    assert!(ctx.tokens.load().expect("token store readable").is_none());
    assert!(!ctx.api.has_token());
}

#[tokio::test]
async fn test_auth_flag_broadcasts_transitions() {
    let ctx = TestContext::new().await;
    ctx.shop.seed_user("alice", "hunter2", false);
    let mut rx = ctx.session.subscribe();
    assert!(!*rx.borrow_and_update());

    ctx.session
        .login(&Credentials::new("alice", "hunter2"))
        .await
        .expect("login");
    rx.changed().await.expect("sender alive");
    assert!(*rx.borrow_and_update());

    ctx.session.logout().await;
    rx.changed().await.expect("sender alive");
    assert!(!*rx.borrow_and_update());
}

#[tokio::test]
async fn test_protected_call_without_login_is_unauthorized() {
    let ctx = TestContext::new().await;

    let err = ctx.api.fetch_cart().await.expect_err("must be rejected");
    assert!(err.is_unauthorized());
    assert!(matches!(
        err,
        ApiError::Rejected(ref rejection) if rejection.kind == RejectionKind::Unauthorized
    ));
}
