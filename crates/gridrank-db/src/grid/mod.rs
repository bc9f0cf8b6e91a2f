//! Database operations for the `grid_cells`, `grid_competitors` and
//! `grid_point_results` tables.

mod read;
mod types;

pub use read::{
    list_grid_cells, list_grid_competitors, list_grid_point_results, load_grid_snapshot,
    COMPETITOR_QUERY_LIMIT,
};
pub use types::{GridCellRow, GridCompetitorRow, GridPointResultRow};
