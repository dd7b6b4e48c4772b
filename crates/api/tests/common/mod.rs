#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use hrm_api::auth::jwt::JwtConfig;
use hrm_api::auth::password::hash_password;
use hrm_api::config::ServerConfig;
use hrm_api::router::build_app_router;
use hrm_api::state::AppState;
use hrm_core::employee::NewEmployee;
use hrm_core::enums::{ContractType, Gender, Role};
use hrm_db::models::employee::Employee;
use hrm_db::repositories::{EmployeeRepo, TokenKind, TokenRepo};
use hrm_events::{EmailError, MailMessage, NotificationSink};

pub const PASSWORD: &str = "test_password_123!";

/// Test `ServerConfig` with a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        token_max_age_days: 1,
        password_min_length: 8,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 30,
        },
    }
}

// ---------------------------------------------------------------------------
// Recording notification sink
// ---------------------------------------------------------------------------

/// Keeps every mail it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Mails are dispatched on spawned tasks; poll until `count` arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<MailMessage> {
        for _ in 0..100 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: MailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Full application router plus the sink it sends mail through.
pub fn build_test_app_with_sink(pool: PgPool) -> (Router, RecordingSink) {
    let config = test_config();
    let sink = RecordingSink::default();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier: Arc::new(sink.clone()),
    };
    (build_app_router(state, &config), sink)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_sink(pool).0
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, None, Some(body)).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn new_employee(email: &str, number: i64) -> NewEmployee {
    NewEmployee {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        number,
        birth_date: None,
        address: None,
        cnss_number: None,
        contract_type: ContractType::Sivp,
        gender: Gender::Male,
        phone_number: None,
        roles: vec![Role::Admin],
    }
}

/// Insert an employee and activate it with [`PASSWORD`].
pub async fn create_active_employee(pool: &PgPool, email: &str, number: i64) -> Employee {
    let created = EmployeeRepo::create(pool, &new_employee(email, number))
        .await
        .expect("employee creation should succeed");
    let token = TokenRepo::find_by_token(pool, TokenKind::Activation, &created.activation_token)
        .await
        .unwrap()
        .expect("activation token should exist");
    let hash = hash_password(PASSWORD).unwrap();
    let activated = EmployeeRepo::activate(pool, created.employee.id, token.id, Some(&hash))
        .await
        .unwrap();
    assert!(activated);
    EmployeeRepo::find_by_id(pool, created.employee.id)
        .await
        .unwrap()
        .unwrap()
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// An active employee and a valid token for them.
pub async fn logged_in(app: &Router, pool: &PgPool) -> (Employee, String) {
    let employee = create_active_employee(pool, "admin@x.com", 1).await;
    let token = login(app.clone(), &employee.email, PASSWORD).await;
    (employee, token)
}
