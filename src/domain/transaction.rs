//! Financed transaction types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle state of a financed transaction.
///
/// Only `Active` principal counts against a customer's limit. The current
/// authorization flow creates transactions directly in `Active`; later
/// transitions are applied by servicing, not by this flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Active,
    PaidOff,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::PaidOff => "paid_off",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "active" => Ok(Self::Active),
            "paid_off" => Ok(Self::PaidOff),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A persisted financed transaction.
///
/// References customer and tenor by identifier. The contract number carries
/// a uniqueness constraint in the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub contract_number: String,
    pub customer_id: Uuid,
    pub tenor_id: Uuid,
    pub asset_name: String,
    pub otr_amount: Decimal,
    pub admin_fee: Decimal,
    pub total_interest: Decimal,
    pub total_installment: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Principal counted against the credit limit: asset price plus admin
    /// fee, excluding interest.
    pub fn principal(&self) -> Decimal {
        self.otr_amount + self.admin_fee
    }
}
