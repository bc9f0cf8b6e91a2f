//! Read operations for one search's cells, competitors and point results.

use gridrank_core::{GridSnapshot, SearchRecord};
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{GridCellRow, GridCompetitorRow, GridPointResultRow};
use crate::{searches::GridSearchRow, DbError};

/// Competitor rows fetched per search before deduplication.
pub const COMPETITOR_QUERY_LIMIT: i64 = 50;

/// Returns all sampled cells of a search, ordered by row then column.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_grid_cells(pool: &PgPool, search_id: Uuid) -> Result<Vec<GridCellRow>, DbError> {
    let rows = sqlx::query_as::<_, GridCellRow>(
        "SELECT grid_row, grid_col, lat, lng, total_businesses \
         FROM grid_cells \
         WHERE search_id = $1 \
         ORDER BY grid_row, grid_col",
    )
    .bind(search_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the highest-coverage competitors of a search.
///
/// Names scraped from map UI controls ("Visit website", "Call ...") are
/// excluded. At most [`COMPETITOR_QUERY_LIMIT`] rows are returned.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_grid_competitors(
    pool: &PgPool,
    search_id: Uuid,
) -> Result<Vec<GridCompetitorRow>, DbError> {
    let rows = sqlx::query_as::<_, GridCompetitorRow>(
        "SELECT id, place_id, name, rating, reviews, appearances, coverage_percent, \
                avg_rank, address, business_lat, business_lng \
         FROM grid_competitors \
         WHERE search_id = $1 \
           AND name NOT LIKE 'Visit %' \
           AND name NOT LIKE 'Get directions%' \
           AND name NOT LIKE 'Call %' \
           AND name NOT LIKE 'Save %' \
           AND name NOT LIKE 'Share %' \
           AND name NOT LIKE 'Website %' \
         ORDER BY coverage_percent DESC NULLS LAST, name, id \
         LIMIT $2",
    )
    .bind(search_id)
    .bind(COMPETITOR_QUERY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every point result of a search joined with its competitor.
///
/// Ordered by grid index, then rank.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_grid_point_results(
    pool: &PgPool,
    search_id: Uuid,
) -> Result<Vec<GridPointResultRow>, DbError> {
    let rows = sqlx::query_as::<_, GridPointResultRow>(
        "SELECT gpr.competitor_id, \
                gc.name AS competitor_name, \
                gc.place_id AS competitor_place_id, \
                gpr.grid_index, gpr.rank_position, \
                gc.rating, gc.reviews \
         FROM grid_point_results gpr \
         JOIN grid_competitors gc ON gc.id = gpr.competitor_id \
         WHERE gpr.search_id = $1 \
         ORDER BY gpr.grid_index, gpr.rank_position, gc.name",
    )
    .bind(search_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load everything the aggregation needs for one search.
///
/// Reads run sequentially on the pool; nothing is written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn load_grid_snapshot(
    pool: &PgPool,
    search: GridSearchRow,
) -> Result<GridSnapshot, DbError> {
    let search_id = search.id;
    let cells = list_grid_cells(pool, search_id).await?;
    let competitors = list_grid_competitors(pool, search_id).await?;
    let point_results = list_grid_point_results(pool, search_id).await?;

    tracing::debug!(
        %search_id,
        cells = cells.len(),
        competitors = competitors.len(),
        point_results = point_results.len(),
        "loaded grid snapshot"
    );

    Ok(GridSnapshot {
        search: SearchRecord::from(search),
        cells: cells.into_iter().map(Into::into).collect(),
        competitors: competitors.into_iter().map(Into::into).collect(),
        point_results: point_results.into_iter().map(Into::into).collect(),
    })
}
