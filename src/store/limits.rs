//! Per-tenor credit limit table
//!
//! One row per (customer, tenor), mutated only by the administrative batch
//! upsert. Authorization reads the limit inside the locking unit of work;
//! the advisory path reads it from the pool.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const FIND_LIMIT_SQL: &str =
    "SELECT limit_amount FROM customer_limits WHERE customer_id = $1 AND tenor_id = $2";

const UPSERT_SQL: &str = r#"
    INSERT INTO customer_limits (customer_id, tenor_id, limit_amount)
    VALUES ($1, $2, $3)
    ON CONFLICT (customer_id, tenor_id)
    DO UPDATE SET limit_amount = EXCLUDED.limit_amount, updated_at = NOW()
"#;

/// A resolved (customer, tenor, amount) triple ready to be written.
#[derive(Debug, Clone)]
pub struct LimitUpsert {
    pub customer_id: Uuid,
    pub tenor_id: Uuid,
    pub limit_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct LimitStore {
    pool: PgPool,
}

impl LimitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Configured limit for a (customer, tenor) pair, if set. Pool read.
    pub async fn find_limit(
        &self,
        customer_id: Uuid,
        tenor_id: Uuid,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        sqlx::query_scalar(FIND_LIMIT_SQL)
            .bind(customer_id)
            .bind(tenor_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Same lookup, evaluated inside the caller's unit of work.
    pub async fn find_limit_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
        tenor_id: Uuid,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        sqlx::query_scalar(FIND_LIMIT_SQL)
            .bind(customer_id)
            .bind(tenor_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write the whole batch inside the caller's transaction. On conflict on
    /// the composite key, the limit amount is overwritten. The caller's
    /// commit or rollback makes this all-or-nothing.
    pub async fn upsert_many(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[LimitUpsert],
    ) -> Result<(), sqlx::Error> {
        for item in items {
            sqlx::query(UPSERT_SQL)
                .bind(item.customer_id)
                .bind(item.tenor_id)
                .bind(item.limit_amount)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// All configured limits for a customer, joined with tenor durations.
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<(Uuid, i32, Decimal)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT cl.tenor_id, t.duration_months, cl.limit_amount
            FROM customer_limits cl
            JOIN tenors t ON t.id = cl.tenor_id
            WHERE cl.customer_id = $1
            ORDER BY t.duration_months
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
    }
}
