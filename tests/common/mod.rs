//! Common test utilities
//!
//! Tests isolate through unique national IDs; setup only guarantees the
//! seeded reference data exists.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use loan_origin::domain::{Customer, VerificationStatus};
use loan_origin::handlers::{
    LimitItem, RegisterCustomerCommand, RegisterCustomerHandler, SetLimitsCommand,
    SetLimitsHandler, VerifyCustomerCommand, VerifyCustomerHandler,
};

/// Unit-of-work deadline used by test handlers
pub const UOW_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect to the test database and seed the tenor catalog
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Seed tenors (durations are unique; existing rows are kept)
    for (months, description) in [
        (1, "1 month financing"),
        (2, "2 month financing"),
        (3, "3 month financing"),
        (6, "6 month financing"),
        (12, "12 month financing"),
    ] {
        sqlx::query(
            r#"
            INSERT INTO tenors (id, duration_months, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (duration_months) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(months)
        .bind(description)
        .execute(&pool)
        .await
        .expect("Failed to seed tenors");
    }

    pool
}

/// A unique national ID for one test
pub fn unique_national_id() -> String {
    format!("31{}", &Uuid::new_v4().simple().to_string()[..14])
}

/// Register a customer, verify it and configure the given per-tenor limits.
pub async fn seed_verified_customer(pool: &PgPool, limits: &[(i32, &str)]) -> Customer {
    let customer = RegisterCustomerHandler::new(pool.clone())
        .execute(RegisterCustomerCommand::new(
            unique_national_id(),
            "Test Customer".to_string(),
        ))
        .await
        .expect("Failed to register customer");

    VerifyCustomerHandler::new(pool.clone(), UOW_TIMEOUT)
        .execute(VerifyCustomerCommand {
            customer_id: customer.id,
            status: VerificationStatus::Verified,
        })
        .await
        .expect("Failed to verify customer");

    if !limits.is_empty() {
        let items = limits
            .iter()
            .map(|(tenor_months, limit_amount)| LimitItem {
                tenor_months: *tenor_months,
                limit_amount: limit_amount.to_string(),
            })
            .collect();

        SetLimitsHandler::new(pool.clone(), UOW_TIMEOUT)
            .execute(SetLimitsCommand::new(customer.id, items))
            .await
            .expect("Failed to set limits");
    }

    Customer {
        verification_status: VerificationStatus::Verified,
        ..customer
    }
}

/// Resolve a tenor id by duration
pub async fn tenor_id_for(pool: &PgPool, months: i32) -> Uuid {
    sqlx::query_scalar("SELECT id FROM tenors WHERE duration_months = $1")
        .bind(months)
        .fetch_one(pool)
        .await
        .expect("Tenor not seeded")
}
