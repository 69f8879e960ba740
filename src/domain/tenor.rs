//! Tenor reference data

use serde::Serialize;
use uuid::Uuid;

/// A loan duration against which limits and interest are defined.
///
/// Seeded at system setup; durations are unique.
#[derive(Debug, Clone, Serialize)]
pub struct Tenor {
    pub id: Uuid,
    pub duration_months: i32,
    pub description: Option<String>,
}
