//! Database module
//!
//! Connection and schema verification utilities.
//! Schema lives as raw SQL files in the migrations/ directory.

use sqlx::PgPool;

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = vec!["customers", "tenors", "customer_limits", "transactions"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    // The tenor catalog is reference data; refusing to boot without it beats
    // failing every request with TenorNotFound.
    if !check_tenor_seed(pool).await? {
        return Ok(false);
    }

    Ok(true)
}

/// Check that the tenor catalog has been seeded
async fn check_tenor_seed(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tenors")
        .fetch_one(pool)
        .await?;

    if count == 0 {
        tracing::error!("Tenor catalog is empty. Please run database seed.");
        return Ok(false);
    }

    tracing::info!("Tenor catalog verified: {} tenors", count);
    Ok(true)
}
