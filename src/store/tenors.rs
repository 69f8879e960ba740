//! Tenor catalog
//!
//! Read-only lookups over seeded reference data. Safe to call inside or
//! outside a unit of work.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Tenor;

#[derive(Debug, Clone)]
pub struct TenorCatalog {
    pool: PgPool,
}

impl TenorCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a tenor by its loan duration in months.
    pub async fn find_by_duration(&self, months: i32) -> Result<Option<Tenor>, sqlx::Error> {
        let row: Option<(Uuid, i32, Option<String>)> = sqlx::query_as(
            "SELECT id, duration_months, description FROM tenors WHERE duration_months = $1",
        )
        .bind(months)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, duration_months, description)| Tenor {
            id,
            duration_months,
            description,
        }))
    }

    /// All configured tenors, shortest first.
    pub async fn find_all(&self) -> Result<Vec<Tenor>, sqlx::Error> {
        let rows: Vec<(Uuid, i32, Option<String>)> = sqlx::query_as(
            "SELECT id, duration_months, description FROM tenors ORDER BY duration_months",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, duration_months, description)| Tenor {
                id,
                duration_months,
                description,
            })
            .collect())
    }
}
