//! Database operations for the `grid_searches` table.

use chrono::{DateTime, Utc};
use gridrank_core::SearchRecord;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `grid_searches` table.
///
/// Aggregate columns the engine never reads (`raw_config`, per-point
/// business counts, session ids) are not selected.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GridSearchRow {
    pub id: Uuid,
    pub search_term: String,
    pub center_lat: Decimal,
    pub center_lng: Decimal,
    pub search_radius_miles: Option<Decimal>,
    pub grid_rows: Option<i32>,
    pub grid_cols: Option<i32>,
    pub initiated_by_place_id: Option<String>,
    pub initiated_by_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub total_unique_businesses: Option<i32>,
    pub success_rate: Option<Decimal>,
    pub execution_time_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<GridSearchRow> for SearchRecord {
    fn from(row: GridSearchRow) -> Self {
        Self {
            id: row.id,
            search_term: row.search_term,
            center_lat: row.center_lat,
            center_lng: row.center_lng,
            search_radius_miles: row.search_radius_miles,
            grid_rows: row.grid_rows,
            grid_cols: row.grid_cols,
            initiated_by_place_id: row.initiated_by_place_id,
            initiated_by_name: row.initiated_by_name,
            city: row.city,
            state: row.state,
            total_unique_businesses: row.total_unique_businesses,
            success_rate: row.success_rate,
            execution_time_seconds: row.execution_time_seconds,
            created_at: row.created_at,
        }
    }
}

/// Optional, case-insensitive equality filters for picking a search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub city: Option<String>,
    pub search_term: Option<String>,
}

impl SearchFilter {
    fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn search_term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the most recent search matching `filter`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no search matches, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn find_latest_grid_search(
    pool: &PgPool,
    filter: &SearchFilter,
) -> Result<GridSearchRow, DbError> {
    let row = sqlx::query_as::<_, GridSearchRow>(
        "SELECT id, search_term, center_lat, center_lng, search_radius_miles, \
                grid_rows, grid_cols, initiated_by_place_id, initiated_by_name, \
                city, state, total_unique_businesses, success_rate, \
                execution_time_seconds, created_at \
         FROM grid_searches \
         WHERE ($1::text IS NULL OR LOWER(city) = LOWER($1)) \
           AND ($2::text IS NULL OR LOWER(search_term) = LOWER($2)) \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(filter.city())
    .bind(filter.search_term())
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Returns a single search by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_grid_search(pool: &PgPool, id: Uuid) -> Result<Option<GridSearchRow>, DbError> {
    let row = sqlx::query_as::<_, GridSearchRow>(
        "SELECT id, search_term, center_lat, center_lng, search_radius_miles, \
                grid_rows, grid_cols, initiated_by_place_id, initiated_by_name, \
                city, state, total_unique_businesses, success_rate, \
                execution_time_seconds, created_at \
         FROM grid_searches \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the newest searches, most recent first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_grid_searches(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<GridSearchRow>, DbError> {
    let rows = sqlx::query_as::<_, GridSearchRow>(
        "SELECT id, search_term, center_lat, center_lng, search_radius_miles, \
                grid_rows, grid_cols, initiated_by_place_id, initiated_by_name, \
                city, state, total_unique_businesses, success_rate, \
                execution_time_seconds, created_at \
         FROM grid_searches \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_ignored() {
        let filter = SearchFilter {
            city: Some("  ".to_string()),
            search_term: Some(" Med Spa ".to_string()),
        };
        assert_eq!(filter.city(), None);
        assert_eq!(filter.search_term(), Some("Med Spa"));
    }
}
