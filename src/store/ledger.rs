//! Transaction ledger
//!
//! Append-only store of financed transactions. Writes happen inside the
//! authorization unit of work; the active-principal aggregate has a pool
//! variant for advisory reads and an in-transaction variant that observes
//! the snapshot protected by the customer row lock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};

const SUM_ACTIVE_SQL: &str = r#"
    SELECT COALESCE(SUM(otr_amount + admin_fee), 0)
    FROM transactions
    WHERE customer_id = $1 AND tenor_id = $2 AND status = 'active'
"#;

type TransactionRow = (
    Uuid,
    String,
    Uuid,
    Uuid,
    String,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    String,
    DateTime<Utc>,
);

const SELECT_COLUMNS: &str = "id, contract_number, customer_id, tenor_id, asset_name, \
     otr_amount, admin_fee, total_interest, total_installment, status, created_at";

fn map_row(row: TransactionRow) -> Result<Transaction, sqlx::Error> {
    let (
        id,
        contract_number,
        customer_id,
        tenor_id,
        asset_name,
        otr_amount,
        admin_fee,
        total_interest,
        total_installment,
        status,
        created_at,
    ) = row;

    let status: TransactionStatus = status
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(e.into()))?;

    Ok(Transaction {
        id,
        contract_number,
        customer_id,
        tenor_id,
        asset_name,
        otr_amount,
        admin_fee,
        total_interest,
        total_installment,
        status,
        created_at,
    })
}

#[derive(Debug, Clone)]
pub struct TransactionLedger {
    pool: PgPool,
}

impl TransactionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sum of active principal for a (customer, tenor) pair; zero when no
    /// active transactions exist. Pool read, advisory only.
    pub async fn sum_active_principal(
        &self,
        customer_id: Uuid,
        tenor_id: Uuid,
    ) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar(SUM_ACTIVE_SQL)
            .bind(customer_id)
            .bind(tenor_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Same aggregate, evaluated inside the caller's unit of work while the
    /// customer row lock is held. This is the authoritative read.
    pub async fn sum_active_principal_in_tx(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        customer_id: Uuid,
        tenor_id: Uuid,
    ) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar(SUM_ACTIVE_SQL)
            .bind(customer_id)
            .bind(tenor_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Append a transaction inside the caller's unit of work. A duplicate
    /// contract number surfaces as a uniqueness-constraint violation.
    pub async fn insert(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        txn: &Transaction,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, contract_number, customer_id, tenor_id, asset_name,
                otr_amount, admin_fee, total_interest, total_installment, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(txn.id)
        .bind(&txn.contract_number)
        .bind(txn.customer_id)
        .bind(txn.tenor_id)
        .bind(&txn.asset_name)
        .bind(txn.otr_amount)
        .bind(txn.admin_fee)
        .bind(txn.total_interest)
        .bind(txn.total_installment)
        .bind(txn.status.as_str())
        .bind(txn.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row).transpose()
    }

    pub async fn find_by_contract_number(
        &self,
        contract_number: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE contract_number = $1",
            SELECT_COLUMNS
        ))
        .bind(contract_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row).transpose()
    }

    /// Transactions for a customer, newest first.
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE customer_id = $1 ORDER BY created_at DESC LIMIT $2",
            SELECT_COLUMNS
        ))
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row).collect()
    }
}
