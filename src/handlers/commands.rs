//! Command definitions
//!
//! Commands represent intentions to change or query the system state.
//! Amounts arrive as strings from the boundary and are parsed into
//! validated domain primitives by the handlers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::VerificationStatus;

/// Command to register a new customer (verification starts pending)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCustomerCommand {
    pub national_id: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    /// Declared monthly salary (as string for precise decimal)
    pub monthly_salary: Option<String>,
}

impl RegisterCustomerCommand {
    pub fn new(national_id: String, full_name: String) -> Self {
        Self {
            national_id,
            full_name,
            birth_date: None,
            monthly_salary: None,
        }
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_monthly_salary(mut self, monthly_salary: String) -> Self {
        self.monthly_salary = Some(monthly_salary);
        self
    }
}

/// Command to drive the verification state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCustomerCommand {
    pub customer_id: Uuid,
    pub status: VerificationStatus,
}

/// Advisory limit check against a customer's credit line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckLimitCommand {
    pub national_id: String,
    pub tenor_months: i32,
    /// Requested principal (as string for precise decimal)
    pub amount: String,
}

impl CheckLimitCommand {
    pub fn new(national_id: String, tenor_months: i32, amount: String) -> Self {
        Self {
            national_id,
            tenor_months,
            amount,
        }
    }
}

/// Command to authorize and record a financed transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionCommand {
    pub national_id: String,
    pub tenor_months: i32,
    pub asset_name: String,
    /// Asset price (as string for precise decimal)
    pub otr_amount: String,
    /// Administrative fee (as string for precise decimal)
    pub admin_fee: String,
}

impl CreateTransactionCommand {
    pub fn new(
        national_id: String,
        tenor_months: i32,
        asset_name: String,
        otr_amount: String,
        admin_fee: String,
    ) -> Self {
        Self {
            national_id,
            tenor_months,
            asset_name,
            otr_amount,
            admin_fee,
        }
    }
}

/// One item in an administrative limit batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitItem {
    pub tenor_months: i32,
    /// Limit amount (as string for precise decimal); negative values are
    /// rejected before any write
    pub limit_amount: String,
}

/// Command to atomically set per-tenor limits for a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLimitsCommand {
    pub customer_id: Uuid,
    pub items: Vec<LimitItem>,
}

impl SetLimitsCommand {
    pub fn new(customer_id: Uuid, items: Vec<LimitItem>) -> Self {
        Self { customer_id, items }
    }
}

/// Outcome of an advisory limit check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitDecision {
    pub approved: bool,
    pub remaining_limit: Decimal,
}
