//! Domain error types
//!
//! Pure business errors that don't depend on infrastructure. Insufficient
//! limit and unset limit are business outcomes, not system failures, and are
//! reported distinctly from storage or lock errors.

use thiserror::Error;

use super::customer::VerificationStatus;

/// Business rule violations surfaced by the authorization and admin flows.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// No customer matches the given identifier or national ID
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Customer exists but has not passed verification
    #[error("Customer is not verified (status: {status})")]
    CustomerNotVerified { status: VerificationStatus },

    /// No tenor is configured for the requested duration
    #[error("Tenor not found for duration: {months} months")]
    TenorNotFound { months: i32 },

    /// No limit is configured for the (customer, tenor) pair
    #[error("No credit limit set for this customer and tenor")]
    LimitNotSet,

    /// A limit amount in an admin batch was negative
    #[error("Invalid limit amount: {0}")]
    InvalidLimitAmount(String),

    /// Remaining limit cannot cover the requested principal
    #[error("Insufficient limit: requested {requested}, remaining {remaining}")]
    InsufficientLimit {
        requested: rust_decimal::Decimal,
        remaining: rust_decimal::Decimal,
    },

    /// Verification attempted on a customer that is no longer pending
    #[error("Customer already verified (status: {current})")]
    VerificationConflict { current: VerificationStatus },
}

impl DomainError {
    /// Create an insufficient limit error
    pub fn insufficient_limit(
        requested: rust_decimal::Decimal,
        remaining: rust_decimal::Decimal,
    ) -> Self {
        Self::InsufficientLimit {
            requested,
            remaining,
        }
    }

    /// Check if this is a client error (caller's request cannot succeed as-is)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::CustomerNotVerified { .. }
                | Self::LimitNotSet
                | Self::InvalidLimitAmount(_)
                | Self::InsufficientLimit { .. }
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict_error(&self) -> bool {
        matches!(self, Self::VerificationConflict { .. })
    }
}
