//! Advisory limit check
//!
//! Read-only preview of the authorization decision. Deliberately non-locking:
//! it may observe stale active principal under concurrent transaction
//! creation and must not be treated as authoritative. The authoritative
//! decision is made by the transaction handler inside a locking unit of work.

use sqlx::PgPool;

use crate::domain::{Amount, DomainError};
use crate::error::AppError;
use crate::store::{CustomerStore, LimitStore, TenorCatalog, TransactionLedger};

use super::{CheckLimitCommand, LimitDecision};

pub struct CheckLimitHandler {
    customers: CustomerStore,
    tenors: TenorCatalog,
    limits: LimitStore,
    ledger: TransactionLedger,
}

impl CheckLimitHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            customers: CustomerStore::new(pool.clone()),
            tenors: TenorCatalog::new(pool.clone()),
            limits: LimitStore::new(pool.clone()),
            ledger: TransactionLedger::new(pool),
        }
    }

    /// Execute the check. Returns the decision together with the remaining
    /// limit, which is reported on rejection as well.
    pub async fn execute(&self, command: CheckLimitCommand) -> Result<LimitDecision, AppError> {
        let requested: Amount = command.amount.parse()?;

        let customer = self
            .customers
            .find_by_national_id(&command.national_id)
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
            .find_limit(customer.id, tenor.id)
            .await?
            .ok_or(DomainError::LimitNotSet)?;

        let used = self.ledger.sum_active_principal(customer.id, tenor.id).await?;
        let remaining = limit - used;

        tracing::debug!(
            customer_id = %customer.id,
            tenor_months = tenor.duration_months,
            %limit,
            %used,
            %remaining,
            "Advisory limit check"
        );

        Ok(LimitDecision {
            approved: remaining >= requested.value(),
            remaining_limit: remaining,
        })
    }
}
