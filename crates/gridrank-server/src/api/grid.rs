use axum::{extract::Query, Extension, Json};
use gridrank_core::DEFAULT_GRID_DIMENSION;
use gridrank_engine::{geometry::DEFAULT_RADIUS_MILES, grid_summary, GridSummary};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GridSummaryQuery {
    pub radius_miles: Option<f64>,
    pub grid_size: Option<u32>,
}

pub(super) async fn get_grid_summary(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GridSummaryQuery>,
) -> Result<Json<ApiResponse<GridSummary>>, ApiError> {
    let summary = grid_summary(
        query.radius_miles.unwrap_or(DEFAULT_RADIUS_MILES),
        query.grid_size.unwrap_or(DEFAULT_GRID_DIMENSION),
    )
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
