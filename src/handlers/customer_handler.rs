//! Customer registration handler

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;

use crate::domain::Customer;
use crate::error::AppError;
use crate::store::CustomerStore;

use super::RegisterCustomerCommand;

pub struct RegisterCustomerHandler {
    customers: CustomerStore,
}

impl RegisterCustomerHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            customers: CustomerStore::new(pool),
        }
    }

    /// Register a new customer; verification starts pending.
    pub async fn execute(&self, command: RegisterCustomerCommand) -> Result<Customer, AppError> {
        let national_id = command.national_id.trim();
        if national_id.is_empty() {
            return Err(AppError::InvalidRequest(
                "national_id must not be empty".to_string(),
            ));
        }
        if command.full_name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "full_name must not be empty".to_string(),
            ));
        }

        let monthly_salary = command
            .monthly_salary
            .as_deref()
            .map(Decimal::from_str)
            .transpose()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid monthly_salary: {}", e)))?;

        if let Some(salary) = monthly_salary {
            if salary < Decimal::ZERO {
                return Err(AppError::InvalidRequest(
                    "monthly_salary must not be negative".to_string(),
                ));
            }
        }

        let customer = self
            .customers
            .insert(
                national_id,
                command.full_name.trim(),
                command.birth_date,
                monthly_salary,
            )
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::DuplicateNationalId
                }
                _ => AppError::Database(e),
            })?;

        tracing::info!(customer_id = %customer.id, "Customer registered");

        Ok(customer)
    }
}
