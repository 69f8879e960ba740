//! Transaction authorization handler
//!
//! The authoritative credit-limit protocol. Every attempt runs inside one
//! atomic unit of work: lock the customer row, re-read the active-principal
//! aggregate under that lock, decide, append the transaction, commit. Any
//! error path drops the transaction, which rolls the unit of work back, so
//! no partial effect is ever observable. A request-scoped deadline bounds
//! how long the unit of work (and therefore the held row lock) may run.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    generate_contract_number, Amount, DomainError, FinancingTerms, LimitAmount, Transaction,
    TransactionStatus,
};
use crate::error::AppError;
use crate::store::{CustomerStore, LimitStore, TenorCatalog, TransactionLedger};

use super::CreateTransactionCommand;

/// Attempts per request: the initial write plus one regeneration after a
/// contract-number collision.
const CONTRACT_WRITE_ATTEMPTS: u32 = 2;

pub struct CreateTransactionHandler {
    customers: CustomerStore,
    tenors: TenorCatalog,
    limits: LimitStore,
    ledger: TransactionLedger,
    pool: PgPool,
    uow_timeout: Duration,
}

impl CreateTransactionHandler {
    pub fn new(pool: PgPool, uow_timeout: Duration) -> Self {
        Self {
            customers: CustomerStore::new(pool.clone()),
            tenors: TenorCatalog::new(pool.clone()),
            limits: LimitStore::new(pool.clone()),
            ledger: TransactionLedger::new(pool.clone()),
            pool,
            uow_timeout,
        }
    }

    /// Authorize the requested principal and record the transaction.
    pub async fn execute(
        &self,
        command: CreateTransactionCommand,
    ) -> Result<Transaction, AppError> {
        let otr: Amount = command
            .otr_amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid otr_amount: {}", e)))?;
        let admin_fee: LimitAmount = command
            .admin_fee
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid admin_fee: {}", e)))?;

        if command.asset_name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "asset_name must not be empty".to_string(),
            ));
        }

        // Deadline expiry cancels the in-flight unit of work; the dropped
        // transaction rolls back and the held row lock is released.
        tokio::time::timeout(
            self.uow_timeout,
            self.authorize(&command, otr.value(), admin_fee.value()),
        )
        .await
        .map_err(|_| AppError::LockTimeout)?
    }

    async fn authorize(
        &self,
        command: &CreateTransactionCommand,
        otr_amount: Decimal,
        admin_fee: Decimal,
    ) -> Result<Transaction, AppError> {
        for attempt in 0..CONTRACT_WRITE_ATTEMPTS {
            match self.try_authorize(command, otr_amount, admin_fee).await {
                Err(AppError::Database(e))
                    if is_unique_violation(&e) && attempt + 1 < CONTRACT_WRITE_ATTEMPTS =>
                {
                    tracing::warn!(
                        "Contract number collision, regenerating (attempt {}/{})",
                        attempt + 1,
                        CONTRACT_WRITE_ATTEMPTS
                    );
                    continue;
                }
                other => return other,
            }
        }

        Err(AppError::Internal(
            "contract number collision persisted after retry".to_string(),
        ))
    }

    /// One unit of work: lock -> read aggregate -> decide -> write -> commit.
    async fn try_authorize(
        &self,
        command: &CreateTransactionCommand,
        otr_amount: Decimal,
        admin_fee: Decimal,
    ) -> Result<Transaction, AppError> {
        let mut tx = self.pool.begin().await?;

        // Exclusive row lock, held until commit or rollback. A concurrent
        // authorization for the same customer blocks here until this unit
        // of work ends and then observes the updated aggregate.
        let customer = self
            .customers
            .lock_by_national_id(&mut tx, &command.national_id)
            .await?
            .ok_or_else(|| DomainError::CustomerNotFound(command.national_id.clone()))?;

        if !customer.is_verified() {
            return Err(DomainError::CustomerNotVerified {
                status: customer.verification_status,
            }
            .into());
        }

        let tenor = self
            .tenors
            .find_by_duration(command.tenor_months)
            .await?
            .ok_or(DomainError::TenorNotFound {
                months: command.tenor_months,
            })?;

        let limit = self
            .limits
            .find_limit_in_tx(&mut tx, customer.id, tenor.id)
            .await?
            .ok_or(DomainError::LimitNotSet)?;

        let used = self
            .ledger
            .sum_active_principal_in_tx(&mut tx, customer.id, tenor.id)
            .await?;

        let terms = FinancingTerms::compute(otr_amount, admin_fee, tenor.duration_months);
        let remaining = limit - used;

        if remaining < terms.principal {
            return Err(DomainError::insufficient_limit(terms.principal, remaining).into());
        }

        let now = Utc::now();
        let txn = Transaction {
            id: Uuid::new_v4(),
            contract_number: generate_contract_number(now),
            customer_id: customer.id,
            tenor_id: tenor.id,
            asset_name: command.asset_name.clone(),
            otr_amount,
            admin_fee,
            total_interest: terms.total_interest,
            total_installment: terms.total_installment,
            status: TransactionStatus::Active,
            created_at: now,
        };

        self.ledger.insert(&mut tx, &txn).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %txn.id,
            contract_number = %txn.contract_number,
            customer_id = %customer.id,
            principal = %terms.principal,
            %remaining,
            "Transaction authorized"
        );

        Ok(txn)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
