//! Customer record store
//!
//! Lookup by identifier and by national ID, in plain and locking modes.
//! The locking reads use `SELECT ... FOR UPDATE` and must be called inside
//! a transaction; the acquired row lock is held until that transaction
//! commits or rolls back, serializing concurrent locking readers of the
//! same customer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Customer, VerificationStatus};

type CustomerRow = (
    Uuid,
    String,
    String,
    Option<NaiveDate>,
    Option<Decimal>,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

const SELECT_COLUMNS: &str = "id, national_id, full_name, birth_date, monthly_salary, \
     verification_status, created_at, updated_at";

fn map_row(row: CustomerRow) -> Result<Customer, sqlx::Error> {
    let (id, national_id, full_name, birth_date, monthly_salary, status, created_at, updated_at) =
        row;

    let verification_status: VerificationStatus = status
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(e.into()))?;

    Ok(Customer {
        id,
        national_id,
        full_name,
        birth_date,
        monthly_salary,
        verification_status,
        created_at,
        updated_at,
    })
}

/// Store for persisted customer rows
#[derive(Debug, Clone)]
pub struct CustomerStore {
    pool: PgPool,
}

impl CustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new customer with pending verification status.
    /// The national ID carries a uniqueness constraint.
    pub async fn insert(
        &self,
        national_id: &str,
        full_name: &str,
        birth_date: Option<NaiveDate>,
        monthly_salary: Option<Decimal>,
    ) -> Result<Customer, sqlx::Error> {
        let row: CustomerRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO customers (id, national_id, full_name, birth_date, monthly_salary, verification_status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(national_id)
        .bind(full_name)
        .bind(birth_date)
        .bind(monthly_salary)
        .fetch_one(&self.pool)
        .await?;

        map_row(row)
    }

    /// Non-locking lookup by identifier. No serialization guarantee.
    pub async fn find_by_id(&self, customer_id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row).transpose()
    }

    /// Non-locking lookup by national ID. May observe stale aggregates under
    /// concurrent writers; acceptable for advisory-only reads.
    pub async fn find_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE national_id = $1",
            SELECT_COLUMNS
        ))
        .bind(national_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row).transpose()
    }

    /// Locking lookup by national ID. Acquires an exclusive row lock held
    /// until the enclosing transaction ends.
    pub async fn lock_by_national_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        national_id: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE national_id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(national_id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(map_row).transpose()
    }

    /// Locking lookup by identifier, for admin flows that mutate
    /// limit-relevant state.
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(map_row).transpose()
    }

    /// Update non-limit profile fields. Absent fields are left unchanged.
    pub async fn update_profile(
        &self,
        customer_id: Uuid,
        full_name: Option<&str>,
        birth_date: Option<NaiveDate>,
        monthly_salary: Option<Decimal>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET full_name = COALESCE($2, full_name),
                birth_date = COALESCE($3, birth_date),
                monthly_salary = COALESCE($4, monthly_salary),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(customer_id)
        .bind(full_name)
        .bind(birth_date)
        .bind(monthly_salary)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Write a new verification status inside the caller's transaction.
    pub async fn set_verification_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
        status: VerificationStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE customers SET verification_status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(customer_id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
