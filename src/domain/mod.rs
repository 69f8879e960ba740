//! Domain module
//!
//! Core domain types and business logic.

pub mod amount;
pub mod customer;
pub mod error;
pub mod financing;
pub mod tenor;
pub mod transaction;

pub use amount::{Amount, AmountError, LimitAmount};
pub use customer::{Customer, VerificationStatus};
pub use error::DomainError;
pub use financing::{generate_contract_number, FinancingTerms, MONTHLY_RATE};
pub use tenor::Tenor;
pub use transaction::{Transaction, TransactionStatus};
