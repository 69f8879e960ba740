//! Financing terms and contract numbering
//!
//! The single place where limit/interest arithmetic lives. Both the advisory
//! limit check and the authoritative transaction path compute through here,
//! so the two cannot drift apart.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Flat monthly interest rate applied to the asset price (policy constant).
pub const MONTHLY_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Deterministic financial terms for one financed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancingTerms {
    /// Asset price plus admin fee; the value counted against the limit.
    pub principal: Decimal,
    /// otr_amount x MONTHLY_RATE x tenor months.
    pub total_interest: Decimal,
    /// principal + total_interest.
    pub total_installment: Decimal,
}

impl FinancingTerms {
    /// Compute terms for an asset price, admin fee and tenor duration.
    pub fn compute(otr_amount: Decimal, admin_fee: Decimal, tenor_months: i32) -> Self {
        let principal = otr_amount + admin_fee;
        let total_interest = otr_amount * MONTHLY_RATE * Decimal::from(tenor_months);
        let total_installment = principal + total_interest;

        Self {
            principal,
            total_interest,
            total_installment,
        }
    }
}

/// Process-wide sequence for contract numbers.
static CONTRACT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a contract number: date component, process-wide counter and a
/// random nonce. Unique with overwhelming probability; the ledger's
/// uniqueness constraint is the backstop, and the caller retries once on a
/// constraint violation.
pub fn generate_contract_number(now: DateTime<Utc>) -> String {
    let seq = CONTRACT_SEQ.fetch_add(1, Ordering::Relaxed) % 1_000_000;
    let nonce: u16 = rand::thread_rng().gen();
    format!("CN-{}-{:06}{:04X}", now.format("%Y%m%d"), seq, nonce)
}
