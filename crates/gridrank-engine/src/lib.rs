//! Grid rank aggregation.
//!
//! Turns the stored rows of one lattice scan into the heat-map payload: a
//! dense grid of per-point rankings, the top competitors with coverage
//! statistics, a competitor × point rank matrix, and the target business
//! summary. Aggregation is synchronous and deterministic; identical input
//! yields identical output.

pub mod analysis;
pub mod competitors;
mod error;
pub mod geometry;
pub mod reconstruct;
pub mod response;
pub mod stats;
pub mod target;

pub use analysis::{business_ranks, render_heat_grid, RankBand, VisibilityReport};
pub use competitors::{CompetitorView, RankMatrix};
pub use error::EngineError;
pub use geometry::{grid_summary, GridPoint, GridSpec, GridSummary, SearchGrid};
pub use reconstruct::{GridPointView, PointCompetitor, TargetMatcher};
pub use response::{GridData, SearchLocation, SearchSummary};
pub use stats::RankStats;
pub use target::TargetBusinessSummary;

use gridrank_core::{GridSnapshot, TargetMatch};

#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    pub target_match: TargetMatch,
}

/// Aggregate a stored search into its published shape.
///
/// # Errors
///
/// Returns [`EngineError::MalformedUpstream`] when the search center or grid
/// dimensions are unusable. Missing cells, stray point results and an absent
/// target are recovered without error.
pub fn aggregate(
    snapshot: &GridSnapshot,
    options: &AggregateOptions,
) -> Result<GridData, EngineError> {
    let search = &snapshot.search;
    let grid = SearchGrid::from_search(search)?;

    let matcher = TargetMatcher::for_search(search, options.target_match);
    let grid_points = reconstruct::reconstruct_grid(
        &grid,
        &snapshot.cells,
        &snapshot.point_results,
        matcher.as_ref(),
    );

    let sampled: Vec<bool> = grid_points.iter().map(|p| p.sampled).collect();
    let published = competitors::publish_competitors(
        &snapshot.competitors,
        &sampled,
        &snapshot.point_results,
    );

    let target_business = matcher.as_ref().and_then(|m| {
        target::summarize_target(
            m,
            &published.competitors,
            &grid_points,
            &snapshot.point_results,
            grid.center,
        )
    });

    tracing::debug!(
        search_id = %search.id,
        cells = snapshot.cells.len(),
        point_results = snapshot.point_results.len(),
        competitors = published.competitors.len(),
        targeted = matcher.is_some(),
        "aggregated grid search"
    );

    Ok(GridData {
        grid_points,
        search_term: search.search_term.clone(),
        target_business,
        competitors: published.competitors,
        competitor_rank_matrix: published.matrix,
        summary: SearchSummary::from_search(search),
        location: SearchLocation::new(search, grid.center),
    })
}
