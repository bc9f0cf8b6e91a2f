//! Row types for the per-search `grid_*` tables.

use gridrank_core::{CellRecord, CompetitorRecord, PointResultRecord};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A row from the `grid_cells` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GridCellRow {
    pub grid_row: i32,
    pub grid_col: i32,
    pub lat: Decimal,
    pub lng: Decimal,
    pub total_businesses: Option<i32>,
}

impl From<GridCellRow> for CellRecord {
    fn from(row: GridCellRow) -> Self {
        Self {
            grid_row: row.grid_row,
            grid_col: row.grid_col,
            lat: row.lat,
            lng: row.lng,
            total_businesses: row.total_businesses,
        }
    }
}

/// A row from the `grid_competitors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GridCompetitorRow {
    pub id: Uuid,
    pub place_id: Option<String>,
    pub name: String,
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
    pub appearances: Option<i32>,
    pub coverage_percent: Option<Decimal>,
    pub avg_rank: Option<Decimal>,
    pub address: Option<String>,
    pub business_lat: Option<Decimal>,
    pub business_lng: Option<Decimal>,
}

impl From<GridCompetitorRow> for CompetitorRecord {
    fn from(row: GridCompetitorRow) -> Self {
        Self {
            id: row.id,
            place_id: row.place_id,
            name: row.name,
            rating: row.rating,
            reviews: row.reviews,
            appearances: row.appearances,
            coverage_percent: row.coverage_percent,
            avg_rank: row.avg_rank,
            address: row.address,
            business_lat: row.business_lat,
            business_lng: row.business_lng,
        }
    }
}

/// A `grid_point_results` row joined with its competitor's identity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GridPointResultRow {
    pub competitor_id: Uuid,
    pub competitor_name: String,
    pub competitor_place_id: Option<String>,
    pub grid_index: i32,
    pub rank_position: i32,
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
}

impl From<GridPointResultRow> for PointResultRecord {
    fn from(row: GridPointResultRow) -> Self {
        Self {
            competitor_id: row.competitor_id,
            competitor_name: row.competitor_name,
            competitor_place_id: row.competitor_place_id,
            grid_index: row.grid_index,
            rank_position: row.rank_position,
            rating: row.rating,
            reviews: row.reviews,
        }
    }
}
