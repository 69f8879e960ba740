//! API integration tests
//!
//! Drive the HTTP boundary end to end: registration, verification, limit
//! administration, advisory checks and transaction authorization.

use std::str::FromStr;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use loan_origin::api::{self, AppState};

mod common;

fn test_app(pool: sqlx::PgPool) -> axum::Router {
    api::create_router().with_state(AppState {
        pool,
        uow_timeout: common::UOW_TIMEOUT,
    })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn decimal_field(json: &Value, field: &str) -> Decimal {
    Decimal::from_str(json[field].as_str().expect(field)).expect(field)
}

#[tokio::test]
async fn test_origination_flow_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let national_id = common::unique_national_id();

    // 1. Register customer
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/customers",
            json!({
                "national_id": national_id,
                "full_name": "Budi Santoso",
                "birth_date": "1990-04-12",
                "monthly_salary": "7500000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "registration failed");
    let customer = read_json(response).await;
    assert_eq!(customer["verification_status"], "pending");
    let customer_id = customer["id"].as_str().unwrap().to_string();

    // 2. Verify customer
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/customers/{}/verify", customer_id),
            json!({"status": "verified"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "verification failed");
    let verified = read_json(response).await;
    assert_eq!(verified["verification_status"], "verified");

    // 3. Set limits for two tenors
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/customers/{}/limits", customer_id),
            json!({
                "items": [
                    {"tenor_months": 3, "limit_amount": "5000000"},
                    {"tenor_months": 6, "limit_amount": "20000000"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "set limits failed");
    let limits = read_json(response).await;
    assert_eq!(limits["limits_written"], 2);

    // 4. Advisory check approves within the limit
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/limits/check",
            json!({
                "national_id": national_id,
                "tenor_months": 6,
                "amount": "10500000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let check = read_json(response).await;
    assert_eq!(check["status"], "approved");
    assert_eq!(decimal_field(&check, "remaining_limit"), dec!(20000000));

    // 5. Create the transaction
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            json!({
                "national_id": national_id,
                "tenor_months": 6,
                "asset_name": "Motorcycle",
                "otr_amount": "10000000",
                "admin_fee": "500000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "authorization failed");
    let txn = read_json(response).await;
    // Deterministic terms: 10,000,000 x 0.02 x 6
    assert_eq!(decimal_field(&txn, "total_interest"), dec!(1200000));
    assert_eq!(decimal_field(&txn, "total_installment"), dec!(11700000));
    assert_eq!(txn["status"], "active");
    let contract_number = txn["contract_number"].as_str().unwrap();
    assert!(contract_number.starts_with("CN-"));

    // 6. The advisory check now sees the reduced remaining limit
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/limits/check",
            json!({
                "national_id": national_id,
                "tenor_months": 6,
                "amount": "10500000"
            }),
        ))
        .await
        .unwrap();
    let check = read_json(response).await;
    assert_eq!(check["status"], "rejected");
    assert_eq!(decimal_field(&check, "remaining_limit"), dec!(9500000));

    // 7. Transaction appears in the customer's listing
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/customers/{}/transactions",
            customer_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = read_json(response).await;
    assert_eq!(listing["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_check_limit_reads_are_idempotent() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[(6, "2000000")]).await;
    let app = test_app(pool);

    let request = json!({
        "national_id": customer.national_id,
        "tenor_months": 6,
        "amount": "500000"
    });

    let first = read_json(
        app.clone()
            .oneshot(json_request("POST", "/limits/check", request.clone()))
            .await
            .unwrap(),
    )
    .await;
    let second = read_json(
        app.clone()
            .oneshot(json_request("POST", "/limits/check", request))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first["status"], "approved");
    assert_eq!(
        decimal_field(&first, "remaining_limit"),
        decimal_field(&second, "remaining_limit")
    );
}

#[tokio::test]
async fn test_unverified_customer_cannot_transact() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let national_id = common::unique_national_id();

    // Register only; verification stays pending
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/customers",
            json!({"national_id": national_id, "full_name": "Pending Customer"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer = read_json(response).await;
    let customer_id = customer["id"].as_str().unwrap().to_string();

    // Limits can be configured ahead of verification
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/customers/{}/limits", customer_id),
            json!({"items": [{"tenor_months": 6, "limit_amount": "50000000"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The gate rejects regardless of limit sufficiency
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            json!({
                "national_id": national_id,
                "tenor_months": 6,
                "asset_name": "Motorcycle",
                "otr_amount": "1000000",
                "admin_fee": "0"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "customer_not_verified");

    // A rejected customer is blocked the same way
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/customers/{}/verify", customer_id),
            json!({"status": "rejected"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            json!({
                "national_id": national_id,
                "tenor_months": 6,
                "asset_name": "Motorcycle",
                "otr_amount": "1000000",
                "admin_fee": "0"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_set_limits_batch_is_atomic() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[]).await;
    let app = test_app(pool);

    // One negative amount poisons the whole batch
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/customers/{}/limits", customer.id),
            json!({
                "items": [
                    {"tenor_months": 1, "limit_amount": "100000"},
                    {"tenor_months": 2, "limit_amount": "-50"},
                    {"tenor_months": 3, "limit_amount": "300000"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "invalid_limit_amount");

    // Zero rows were written
    let response = app
        .clone()
        .oneshot(get_request(&format!("/customers/{}/limits", customer.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["limits"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_set_limits_unknown_tenor_rolls_back() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[]).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/customers/{}/limits", customer.id),
            json!({
                "items": [
                    {"tenor_months": 6, "limit_amount": "100000"},
                    {"tenor_months": 7, "limit_amount": "100000"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "tenor_not_found");
    assert!(body["details"].as_str().unwrap().contains('7'));

    let response = app
        .clone()
        .oneshot(get_request(&format!("/customers/{}/limits", customer.id)))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["limits"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_set_limits_overwrites_on_conflict() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[(6, "1000000")]).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/customers/{}/limits", customer.id),
            json!({"items": [{"tenor_months": 6, "limit_amount": "2500000"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/customers/{}/limits", customer.id)))
        .await
        .unwrap();
    let body = read_json(response).await;
    let limits = body["limits"].as_array().unwrap();
    assert_eq!(limits.len(), 1);
    assert_eq!(decimal_field(&limits[0], "limit_amount"), dec!(2500000));
}

#[tokio::test]
async fn test_reverification_conflicts() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[]).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/customers/{}/verify", customer.id),
            json!({"status": "rejected"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "verification_conflict");
}

#[tokio::test]
async fn test_duplicate_national_id_conflicts() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let national_id = common::unique_national_id();

    let request = json!({"national_id": national_id, "full_name": "First"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/customers", request.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/customers", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "duplicate_national_id");
}

#[tokio::test]
async fn test_check_limit_unset_limit() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[(6, "1000000")]).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/limits/check",
            json!({
                "national_id": customer.national_id,
                "tenor_months": 12,
                "amount": "500000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "limit_not_set");
}

#[tokio::test]
async fn test_profile_update_keeps_non_limit_fields() {
    let pool = common::setup_test_db().await;
    let customer = common::seed_verified_customer(&pool, &[]).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/customers/{}", customer.id),
            json!({"full_name": "Renamed Customer"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["full_name"], "Renamed Customer");
    // Verification status is not a profile field
    assert_eq!(body["verification_status"], "verified");
    assert_eq!(body["national_id"], Value::String(customer.national_id));
}

#[tokio::test]
async fn test_unknown_customer_404s() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/customers/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/limits/check",
            json!({
                "national_id": "9999999999999999",
                "tenor_months": 6,
                "amount": "500000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "customer_not_found");
}

#[tokio::test]
async fn test_tenor_listing() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);

    let response = app.clone().oneshot(get_request("/tenors")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let tenors = body.as_array().unwrap();
    assert!(tenors.len() >= 5);
    // Shortest first
    assert_eq!(tenors[0]["duration_months"], 1);
}
