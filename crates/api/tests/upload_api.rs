//! HTTP-level tests for the bulk employee import.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app_with_sink, get, logged_in, post_json, post_json_auth};
use hrm_db::repositories::{EmployeeRepo, ErrorJournalRepo, TokenKind, TokenRepo};
use hrm_events::MailTemplate;
use serde_json::{json, Value};
use sqlx::PgPool;

const UPLOAD: &str = "/api/v1/employees/upload";

/// One uploaded line, columns in the order given.
fn line(row: i64, fields: &[(&str, &str)]) -> Value {
    let cells: serde_json::Map<String, Value> = fields
        .iter()
        .enumerate()
        .map(|(col, (key, value))| {
            (
                key.to_string(),
                json!({ "rowIndex": row, "colIndex": col, "value": value }),
            )
        })
        .collect();
    Value::Object(cells)
}

fn ann_lee(email: &str, number: &str) -> Vec<(&'static str, String)> {
    vec![
        ("first_name", "Ann".to_string()),
        ("last_name", "Lee".to_string()),
        ("email", email.to_string()),
        ("number", number.to_string()),
        ("gender", "Female".to_string()),
        ("contract_type", "Cdi".to_string()),
        ("cnss_number", "12345678-90".to_string()),
        ("employee_roles", "Manager".to_string()),
    ]
}

fn to_line(row: i64, fields: &[(&'static str, String)]) -> Value {
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    line(row, &pairs)
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    n
}

// ---------------------------------------------------------------------------
// Accepted uploads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_line_is_committed_and_mailed(pool: PgPool) {
    let (app, sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    let body = json!({ "lines": [to_line(1, &ann_lee("ann@x.com", "5"))] });
    let response = post_json_auth(app, UPLOAD, body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({ "detail": "File uploaded successfully", "status_code": 201 })
    );

    let ann = EmployeeRepo::find_by_email(&pool, "ann@x.com")
        .await
        .unwrap()
        .expect("Ann should be persisted");
    assert_eq!(ann.account_status, "Inactive");
    assert_eq!(ann.number, 5);
    assert_eq!(ann.cnss_number.as_deref(), Some("12345678-90"));
    assert_eq!(
        EmployeeRepo::roles_for(&pool, ann.id).await.unwrap(),
        vec!["Manager"]
    );

    let tokens = TokenRepo::list_for_employee(&pool, TokenKind::Activation, ann.id)
        .await
        .unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].status, "Pending");

    let mails = sink.wait_for(1).await;
    let to_ann: Vec<_> = mails
        .iter()
        .filter(|m| m.recipients == vec!["ann@x.com".to_string()])
        .collect();
    assert_eq!(to_ann.len(), 1);
    assert_eq!(to_ann[0].template, MailTemplate::ConfirmAccount);
    assert_eq!(to_ann[0].variables["name"], "Ann Lee");
    assert_eq!(to_ann[0].variables["token"], tokens[0].token);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn multi_role_batch_creates_one_link_per_role(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    let mut first = ann_lee("ann@x.com", "5");
    first[7].1 = "Manager, Cashier".to_string();
    let second = ann_lee("bob@x.com", "6");
    let body = json!({ "lines": [to_line(1, &first), to_line(2, &second)] });

    let response = post_json_auth(app, UPLOAD, body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The logged-in admin accounts for one row of each table.
    assert_eq!(count(&pool, "employees").await, 3);
    assert_eq!(count(&pool, "employee_roles").await, 1 + 3);
    assert_eq!(count(&pool, "accounts_activation").await, 1 + 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn forced_upload_commits_despite_warnings(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    let mut fields = ann_lee("ann@x.com", "5");
    fields.push(("phone_number", "12".to_string()));
    let row = to_line(1, &fields);

    let response =
        post_json_auth(app.clone(), UPLOAD, json!({ "lines": [row.clone()] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json.get("errors").is_none());
    assert_eq!(
        json["warnings"],
        "Line 1: Phone number is not valid, it should be of 8 digits"
    );

    let response = post_json_auth(
        app,
        UPLOAD,
        json!({ "lines": [row], "force_upload": true }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let ann = EmployeeRepo::find_by_email(&pool, "ann@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ann.phone_number, None);
}

// ---------------------------------------------------------------------------
// Rejected uploads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cdi_without_cnss_is_rejected_and_nothing_persisted(pool: PgPool) {
    let (app, sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;
    let mails_before = sink.sent().len();

    let fields: Vec<_> = ann_lee("ann@x.com", "5")
        .into_iter()
        .filter(|(k, _)| *k != "cnss_number")
        .collect();
    let body = json!({ "lines": [to_line(1, &fields)], "force_upload": true });

    let response = post_json_auth(app, UPLOAD, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["errors"], "Line 1: Cnss Number is mandatory but missing");
    assert_eq!(json["wrongCells"], json!([]));
    assert_eq!(json["detail"], "Something went wrong");
    assert_eq!(json["status_code"], 400);

    assert!(EmployeeRepo::find_by_email(&pool, "ann@x.com")
        .await
        .unwrap()
        .is_none());
    assert_eq!(count(&pool, "employees").await, 1);
    assert_eq!(sink.sent().len(), mails_before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_in_file_flags_second_line(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    let body = json!({
        "lines": [
            to_line(1, &ann_lee("ann@x.com", "5")),
            to_line(2, &ann_lee("ann@x.com", "6")),
        ]
    });
    let response = post_json_auth(app, UPLOAD, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(
        json["errors"],
        "Line 2: Email should be unique but this value exists more than one time in the file"
    );
    let cells = json["wrongCells"].as_array().unwrap();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0]["rowIndex"], 2);
    assert_eq!(cells[0]["colIndex"], 2);
    assert_eq!(count(&pool, "employees").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn email_already_stored_is_an_error(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    let (admin, token) = logged_in(&app, &pool).await;

    let body = json!({ "lines": [to_line(1, &ann_lee(&admin.email, "5"))] });
    let response = post_json_auth(app, UPLOAD, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(
        json["errors"],
        "Line 1: Email should be unique. admin@x.com already exist in database"
    );
    assert_eq!(json["wrongCells"][0]["rowIndex"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn commit_conflict_rolls_back_whole_batch_and_is_journaled(pool: PgPool) {
    let (app, sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    // Distinct in the file, equal once parsed: only the unique index sees it.
    let body = json!({
        "lines": [
            to_line(1, &ann_lee("ann@x.com", "07")),
            to_line(2, &ann_lee("bob@x.com", "7")),
        ]
    });
    let response = post_json_auth(app, UPLOAD, body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Number should be unique");

    assert_eq!(count(&pool, "employees").await, 1);
    assert_eq!(count(&pool, "employee_roles").await, 1);
    assert_eq!(count(&pool, "accounts_activation").await, 1);

    let journal = ErrorJournalRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(journal.len(), 1);
    assert!(journal[0].text.contains("uq_employees_number"));
    assert_eq!(journal[0].employee_id, None);

    assert!(sink.sent().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_file_is_a_structural_error(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    let response = post_json_auth(app, UPLOAD, json!({ "lines": [] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Empty file");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unmapped_mandatory_columns_are_listed(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool.clone());
    let (_admin, token) = logged_in(&app, &pool).await;

    let body = json!({ "lines": [line(1, &[("email", "ann@x.com")])] });
    let response = post_json_auth(app, UPLOAD, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing mandatory fields : First Name, Last Name, Number, Contract Type, Gender, Roles"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_requires_authentication(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool);
    let response = post_json(app, UPLOAD, json!({ "lines": [] })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Field catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_fields_lists_catalog_in_order(pool: PgPool) {
    let (app, _sink) = build_test_app_with_sink(pool);
    let response = get(app, "/api/v1/employees/import-fields").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let fields = json["possible_fields"].as_array().unwrap();
    assert_eq!(fields.len(), 11);
    assert_eq!(fields[0]["value"], "first_name");
    assert_eq!(fields[0]["display_value"], "First Name");
    assert_eq!(fields[0]["mandatory"], true);

    let email = fields.iter().find(|f| f["value"] == "email").unwrap();
    assert_eq!(email["conditions"].as_array().unwrap().len(), 1);
    let number = fields.iter().find(|f| f["value"] == "number").unwrap();
    assert_eq!(number["type"], "integer");
}
