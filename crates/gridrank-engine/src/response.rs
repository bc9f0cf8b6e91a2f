use gridrank_core::SearchRecord;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::competitors::{CompetitorView, RankMatrix};
use crate::geometry::GridPoint;
use crate::reconstruct::GridPointView;
use crate::target::TargetBusinessSummary;

/// The aggregation of one stored search, shaped for the heat-map page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    pub grid_points: Vec<GridPointView>,
    pub search_term: String,
    pub target_business: Option<TargetBusinessSummary>,
    pub competitors: Vec<CompetitorView>,
    pub competitor_rank_matrix: RankMatrix,
    pub summary: SearchSummary,
    pub location: SearchLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub total_unique_businesses: Option<i32>,
    /// Whole percent with a trailing `%`.
    pub success_rate: String,
    pub execution_time: Option<i32>,
    pub elapsed_time: Option<i32>,
}

impl SearchSummary {
    #[must_use]
    pub fn from_search(search: &SearchRecord) -> Self {
        Self {
            total_unique_businesses: search.total_unique_businesses,
            success_rate: format_success_rate(search.success_rate),
            execution_time: search.execution_time_seconds,
            elapsed_time: search.execution_time_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub center_lat: f64,
    pub center_lng: f64,
}

impl SearchLocation {
    #[must_use]
    pub fn new(search: &SearchRecord, center: GridPoint) -> Self {
        Self {
            city: search.city.clone(),
            state: search.state.clone(),
            center_lat: center.lat,
            center_lng: center.lng,
        }
    }
}

/// `"<n>%"` with halves rounded up; a missing rate reads `"0%"`.
#[must_use]
pub fn format_success_rate(rate: Option<Decimal>) -> String {
    let whole = rate
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{whole}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_rounds_to_whole_percent() {
        assert_eq!(format_success_rate(Some(Decimal::new(9_450, 2))), "95%");
        assert_eq!(format_success_rate(Some(Decimal::new(9_449, 2))), "94%");
        assert_eq!(format_success_rate(Some(Decimal::new(100, 0))), "100%");
    }

    #[test]
    fn missing_success_rate_is_zero_percent() {
        assert_eq!(format_success_rate(None), "0%");
    }
}
