//! Store module
//!
//! Persistence layer over PostgreSQL. Stores are plain structs over a
//! connection pool; operations that must participate in the enclosing unit
//! of work take the transaction explicitly.

mod customers;
mod ledger;
mod limits;
mod tenors;

pub use customers::CustomerStore;
pub use ledger::TransactionLedger;
pub use limits::{LimitStore, LimitUpsert};
pub use tenors::TenorCatalog;
