//! Limit administration handler
//!
//! Validates and atomically writes per-tenor limits for a customer. Every
//! item is validated before any write; a single failing item rolls the whole
//! batch back with zero limits written.

use std::time::Duration;

use sqlx::PgPool;

use crate::domain::{DomainError, LimitAmount};
use crate::error::AppError;
use crate::store::{CustomerStore, LimitStore, LimitUpsert, TenorCatalog};

use super::SetLimitsCommand;

pub struct SetLimitsHandler {
    customers: CustomerStore,
    tenors: TenorCatalog,
    limits: LimitStore,
    pool: PgPool,
    uow_timeout: Duration,
}

impl SetLimitsHandler {
    pub fn new(pool: PgPool, uow_timeout: Duration) -> Self {
        Self {
            customers: CustomerStore::new(pool.clone()),
            tenors: TenorCatalog::new(pool.clone()),
            limits: LimitStore::new(pool.clone()),
            pool,
            uow_timeout,
        }
    }

    /// Execute the batch upsert inside one unit of work.
    pub async fn execute(&self, command: SetLimitsCommand) -> Result<usize, AppError> {
        tokio::time::timeout(self.uow_timeout, self.apply(&command))
            .await
            .map_err(|_| AppError::LockTimeout)?
    }

    async fn apply(&self, command: &SetLimitsCommand) -> Result<usize, AppError> {
        if command.items.is_empty() {
            return Err(AppError::InvalidRequest(
                "limit batch must not be empty".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // Lock the customer row so the batch serializes against concurrent
        // authorizations reading these limits.
        let customer = self
            .customers
            .lock_by_id(&mut tx, command.customer_id)
            .await?
            .ok_or_else(|| DomainError::CustomerNotFound(command.customer_id.to_string()))?;

        let mut upserts = Vec::with_capacity(command.items.len());
        for item in &command.items {
            let limit_amount: LimitAmount = item
                .limit_amount
                .parse()
                .map_err(|e| DomainError::InvalidLimitAmount(format!("{}", e)))?;

            let tenor = self
                .tenors
                .find_by_duration(item.tenor_months)
                .await?
                .ok_or(DomainError::TenorNotFound {
                    months: item.tenor_months,
                })?;

            upserts.push(LimitUpsert {
                customer_id: customer.id,
                tenor_id: tenor.id,
                limit_amount: limit_amount.value(),
            });
        }

        self.limits.upsert_many(&mut tx, &upserts).await?;

        tx.commit().await?;

        tracing::info!(
            customer_id = %customer.id,
            count = upserts.len(),
            "Customer limits written"
        );

        Ok(upserts.len())
    }
}
