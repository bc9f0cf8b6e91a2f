use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gridrank_db::{GridSearchRow, SearchFilter};
use gridrank_engine::{aggregate, response::format_success_rate, AggregateOptions, GridData};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, map_engine_error, normalize_limit, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GridSearchResponse {
    search_id: Uuid,
    created_at: DateTime<Utc>,
    grid_data: GridData,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatestQuery {
    pub city: Option<String>,
    #[serde(alias = "searchTerm")]
    pub search_term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecentQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct RecentSearchItem {
    id: Uuid,
    search_term: String,
    city: Option<String>,
    state: Option<String>,
    initiated_by_name: Option<String>,
    total_unique_businesses: Option<i32>,
    success_rate: String,
    execution_time_seconds: Option<i32>,
    created_at: DateTime<Utc>,
}

pub(super) async fn get_latest_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<ApiResponse<GridSearchResponse>>, ApiError> {
    let filter = SearchFilter {
        city: query.city,
        search_term: query.search_term,
    };
    let search = gridrank_db::find_latest_grid_search(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    respond_with_aggregation(&state, search, req_id).await
}

pub(super) async fn get_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(search_id): Path<String>,
) -> Result<Json<ApiResponse<GridSearchResponse>>, ApiError> {
    let search_id = Uuid::parse_str(&search_id).map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("invalid grid search id: {search_id}"),
        )
    })?;

    let search = gridrank_db::get_grid_search(&state.pool, search_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| map_db_error(req_id.0.clone(), &gridrank_db::DbError::NotFound))?;

    respond_with_aggregation(&state, search, req_id).await
}

pub(super) async fn list_recent_searches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<RecentSearchItem>>>, ApiError> {
    let rows = gridrank_db::list_recent_grid_searches(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| RecentSearchItem {
            id: row.id,
            search_term: row.search_term,
            city: row.city,
            state: row.state,
            initiated_by_name: row.initiated_by_name,
            total_unique_businesses: row.total_unique_businesses,
            success_rate: format_success_rate(row.success_rate),
            execution_time_seconds: row.execution_time_seconds,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn respond_with_aggregation(
    state: &AppState,
    search: GridSearchRow,
    req_id: RequestId,
) -> Result<Json<ApiResponse<GridSearchResponse>>, ApiError> {
    let search_id = search.id;
    let created_at = search.created_at;

    let snapshot = gridrank_db::load_grid_snapshot(&state.pool, search)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let options = AggregateOptions {
        target_match: state.target_match,
    };
    let grid_data =
        aggregate(&snapshot, &options).map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: GridSearchResponse {
            search_id,
            created_at,
            grid_data,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
