//! HTTP-level tests for login, logout and the password reset flow.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app_with_sink, create_active_employee, get_auth, login, new_employee,
    patch_json, post_json, post_json_auth, PASSWORD,
};
use hrm_db::repositories::EmployeeRepo;
use hrm_events::MailTemplate;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_bearer_token(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    create_active_employee(&pool, "ann@x.com", 5).await;

    let body = json!({ "email": "ann@x.com", "password": PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_failures(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    create_active_employee(&pool, "ann@x.com", 5).await;
    EmployeeRepo::create(&pool, &new_employee("bob@x.com", 6))
        .await
        .unwrap();

    let cases = [
        ("ghost@x.com", PASSWORD, StatusCode::NOT_FOUND, "Email not found"),
        ("bob@x.com", PASSWORD, StatusCode::BAD_REQUEST, "Your account is inactive"),
        ("ann@x.com", "incorrect", StatusCode::BAD_REQUEST, "Wrong password"),
    ];
    for (email, password, status, message) in cases {
        let body = json!({ "email": email, "password": password });
        let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), status, "{email}");
        assert_eq!(body_json(response).await["error"], message);
    }
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_the_token(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    create_active_employee(&pool, "ann@x.com", 5).await;
    let token = login(app.clone(), "ann@x.com", PASSWORD).await;

    let response = get_auth(app.clone(), "/api/v1/employees", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(app.clone(), "/api/v1/auth/logout", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/employees", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let fresh = login(app.clone(), "ann@x.com", PASSWORD).await;
    let response = get_auth(app, "/api/v1/employees", &fresh).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_bearer_is_rejected(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool);
    let response = get_auth(app, "/api/v1/employees", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_then_create_password(pool: PgPool) {
    let (app, sink) = build_test_app_with_sink(pool.clone());
    create_active_employee(&pool, "ann@x.com", 5).await;

    let response = post_json(
        app.clone(),
        "/api/v1/auth/reset-password",
        json!({ "email": "ann@x.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Check your email to reset your password"
    );

    let mails = sink.wait_for(1).await;
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].template, MailTemplate::ResetPassword);
    let uri = format!(
        "/api/v1/auth/create-password?token={}",
        mails[0].variables["token"]
    );

    let mismatch = json!({ "password": "brand-new-pass", "confirm_password": "other" });
    let response = patch_json(app.clone(), &uri, mismatch).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Password must be match");

    let body = json!({ "password": "brand-new-pass", "confirm_password": "brand-new-pass" });
    let response = patch_json(app.clone(), &uri, body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Reset password successfully"
    );

    login(app.clone(), "ann@x.com", "brand-new-pass").await;

    let response = patch_json(app, &uri, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Token already used");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_for_unknown_email_is_404(pool: PgPool) {
    let (app, sink) = build_test_app_with_sink(pool);
    let response = post_json(
        app,
        "/api/v1/auth/reset-password",
        json!({ "email": "ghost@x.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Email not found");
    assert!(sink.sent().is_empty());
}
