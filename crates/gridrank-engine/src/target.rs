//! Statistics for the business a search was commissioned for.

use gridrank_core::{PointResultRecord, Rank};
use serde::Serialize;

use crate::competitors::CompetitorView;
use crate::geometry::GridPoint;
use crate::reconstruct::{GridPointView, TargetMatcher};
use crate::stats::RankStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetBusinessSummary {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: f64,
    pub reviews: i32,
    pub coverage: f64,
    pub points_found: usize,
    pub total_points: usize,
    pub avg_rank: f64,
    pub best_rank: Rank,
    pub worst_rank: Rank,
}

/// Summarize the target across the reconstructed grid.
///
/// Returns `None` when the target is not among the published competitors or
/// no point result ever names it; an absent target is never reported as a
/// zero-filled summary.
#[must_use]
pub fn summarize_target(
    matcher: &TargetMatcher,
    competitors: &[CompetitorView],
    points: &[GridPointView],
    results: &[PointResultRecord],
    center: GridPoint,
) -> Option<TargetBusinessSummary> {
    let observed = results
        .iter()
        .any(|r| matcher.matches(&r.competitor_name, r.competitor_place_id.as_deref()));
    if !observed {
        tracing::warn!(
            target_name = matcher.name().unwrap_or_default(),
            "target business has no point results"
        );
        return None;
    }

    let competitor = competitors.iter().find(|c| match matcher.name() {
        Some(name) => c.name == name,
        None => matcher.place_id().is_some() && c.place_id.as_deref() == matcher.place_id(),
    });
    let Some(competitor) = competitor else {
        tracing::warn!(
            target_name = matcher.name().unwrap_or_default(),
            "target business not found among competitors"
        );
        return None;
    };

    let ranks: Vec<Rank> = points
        .iter()
        .map(|p| p.target_rank.unwrap_or(Rank::NotFound))
        .collect();
    let stats = RankStats::from_ranks(&ranks);
    let sentinel = f64::from(Rank::NotFound.to_wire());

    Some(TargetBusinessSummary {
        name: matcher.name().unwrap_or(&competitor.name).to_string(),
        lat: competitor.lat.unwrap_or(center.lat),
        lng: competitor.lng.unwrap_or(center.lng),
        rating: competitor.rating,
        reviews: competitor.reviews,
        coverage: competitor.coverage,
        points_found: stats.appearances,
        total_points: points.len(),
        avg_rank: stats.avg_rank.unwrap_or(sentinel),
        best_rank: stats.best_rank.map_or(Rank::NotFound, Rank::Found),
        worst_rank: stats.worst_rank.map_or(Rank::NotFound, Rank::Found),
    })
}
