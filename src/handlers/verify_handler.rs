//! Customer verification handler
//!
//! Drives the pending -> verified | rejected state machine. Terminal states
//! never transition again; a second verification attempt is a conflict.

use std::time::Duration;

use sqlx::PgPool;

use crate::domain::{Customer, DomainError, VerificationStatus};
use crate::error::AppError;
use crate::store::CustomerStore;

use super::VerifyCustomerCommand;

pub struct VerifyCustomerHandler {
    customers: CustomerStore,
    pool: PgPool,
    uow_timeout: Duration,
}

impl VerifyCustomerHandler {
    pub fn new(pool: PgPool, uow_timeout: Duration) -> Self {
        Self {
            customers: CustomerStore::new(pool.clone()),
            pool,
            uow_timeout,
        }
    }

    pub async fn execute(&self, command: VerifyCustomerCommand) -> Result<Customer, AppError> {
        if !command.status.is_terminal() {
            return Err(AppError::InvalidRequest(format!(
                "verification outcome must be verified or rejected, got {}",
                command.status
            )));
        }

        tokio::time::timeout(self.uow_timeout, self.apply(&command))
            .await
            .map_err(|_| AppError::LockTimeout)?
    }

    async fn apply(&self, command: &VerifyCustomerCommand) -> Result<Customer, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut customer = self
            .customers
            .lock_by_id(&mut tx, command.customer_id)
            .await?
            .ok_or_else(|| DomainError::CustomerNotFound(command.customer_id.to_string()))?;

        if customer.verification_status != VerificationStatus::Pending {
            return Err(DomainError::VerificationConflict {
                current: customer.verification_status,
            }
            .into());
        }

        self.customers
            .set_verification_status(&mut tx, customer.id, command.status)
            .await?;

        tx.commit().await?;

        customer.verification_status = command.status;

        tracing::info!(
            customer_id = %customer.id,
            status = %command.status,
            "Customer verification recorded"
        );

        Ok(customer)
    }
}
