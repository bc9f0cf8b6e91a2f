//! Dense lattice reconstruction from possibly incomplete cell rows.

use std::collections::HashMap;

use gridrank_core::{
    CellRecord, PointResultRecord, Rank, SearchRecord, TargetMatch, TOP_COMPETITORS,
};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::geometry::{decimal_to_f64, GridPoint, SearchGrid};

/// One lattice position as published to the heat map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPointView {
    pub lat: f64,
    pub lng: f64,
    pub grid_row: u32,
    pub grid_col: u32,
    pub total_results: i32,
    pub top_competitors: Vec<PointCompetitor>,
    /// Present only for targeted searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_rank: Option<Rank>,
    /// False when no cell row exists and the position was synthesized.
    #[serde(skip)]
    pub sampled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCompetitor {
    pub name: String,
    pub rank: Rank,
    pub rating: f64,
    pub reviews: i32,
}

/// Recognises the search's target business among point results.
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    place_id: Option<String>,
    name: Option<String>,
    mode: TargetMatch,
    words: Vec<String>,
}

impl TargetMatcher {
    /// `None` when the search was not commissioned for a business.
    #[must_use]
    pub fn for_search(search: &SearchRecord, mode: TargetMatch) -> Option<Self> {
        if !search.is_targeted() {
            return None;
        }
        let name = search.target_name().map(str::to_string);
        let words = name
            .as_deref()
            .map(|n| {
                n.to_lowercase()
                    .split_whitespace()
                    .filter(|w| w.chars().count() > 2)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            place_id: search.target_place_id().map(str::to_string),
            name,
            mode,
            words,
        })
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn place_id(&self) -> Option<&str> {
        self.place_id.as_deref()
    }

    #[must_use]
    pub fn matches(&self, name: &str, place_id: Option<&str>) -> bool {
        if let (Some(target), Some(candidate)) = (self.place_id.as_deref(), place_id) {
            if candidate.trim() == target {
                return true;
            }
        }
        let Some(target) = self.name.as_deref() else {
            return false;
        };
        match self.mode {
            TargetMatch::Exact => name == target,
            TargetMatch::Words => {
                let candidate = name.to_lowercase();
                if self.words.is_empty() {
                    candidate == target.to_lowercase()
                } else {
                    self.words.iter().all(|w| candidate.contains(w.as_str()))
                }
            }
        }
    }

    /// Best rank of the target among one point's results.
    #[must_use]
    pub fn rank_among(&self, results: &[&PointResultRecord]) -> Rank {
        results
            .iter()
            .filter(|r| self.matches(&r.competitor_name, r.competitor_place_id.as_deref()))
            .map(|r| Rank::from_stored(r.rank_position))
            .fold(Rank::NotFound, Rank::best)
    }
}

/// Group point results by grid index, dropping indices outside the lattice.
pub(crate) fn results_by_index<'a>(
    total_points: usize,
    results: &'a [PointResultRecord],
) -> Vec<Vec<&'a PointResultRecord>> {
    let mut by_index: Vec<Vec<&PointResultRecord>> = vec![Vec::new(); total_points];
    let mut skipped = 0_usize;
    for result in results {
        match usize::try_from(result.grid_index)
            .ok()
            .and_then(|i| by_index.get_mut(i))
        {
            Some(slot) => slot.push(result),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, total_points, "point results outside the grid were ignored");
    }
    by_index
}

/// Rebuild all `rows × cols` positions in row-major order.
#[must_use]
pub fn reconstruct_grid(
    grid: &SearchGrid,
    cells: &[CellRecord],
    results: &[PointResultRecord],
    target: Option<&TargetMatcher>,
) -> Vec<GridPointView> {
    let spec = grid.spec;
    let mut cells_by_index: HashMap<usize, &CellRecord> = HashMap::with_capacity(cells.len());
    for cell in cells {
        let index = u32::try_from(cell.grid_row)
            .ok()
            .zip(u32::try_from(cell.grid_col).ok())
            .and_then(|(row, col)| spec.index(row, col));
        match index {
            Some(i) => {
                cells_by_index.entry(i).or_insert(cell);
            }
            None => tracing::warn!(
                grid_row = cell.grid_row,
                grid_col = cell.grid_col,
                "grid cell outside the lattice was ignored"
            ),
        }
    }

    let missing = spec.total_points() - cells_by_index.len();
    if missing > 0 {
        tracing::debug!(missing, "synthesizing positions for missing grid cells");
    }

    let by_index = results_by_index(spec.total_points(), results);

    grid.lattice()
        .into_iter()
        .map(|lp| match cells_by_index.get(&lp.index) {
            Some(cell) => sampled_point(grid, lp.row, lp.col, cell, &by_index[lp.index], target),
            None => GridPointView {
                lat: lp.point.lat,
                lng: lp.point.lng,
                grid_row: lp.row,
                grid_col: lp.col,
                total_results: 0,
                top_competitors: Vec::new(),
                target_rank: target.map(|_| Rank::NotFound),
                sampled: false,
            },
        })
        .collect()
}

fn sampled_point(
    grid: &SearchGrid,
    row: u32,
    col: u32,
    cell: &CellRecord,
    results: &[&PointResultRecord],
    target: Option<&TargetMatcher>,
) -> GridPointView {
    let point = cell_point(cell).unwrap_or_else(|| {
        tracing::warn!(row, col, "unusable cell coordinates; using lattice position");
        grid.position(row, col)
    });

    let mut top: Vec<PointCompetitor> = results
        .iter()
        .filter_map(|r| {
            let rank = Rank::from_stored(r.rank_position);
            rank.is_found().then(|| PointCompetitor {
                name: r.competitor_name.clone(),
                rank,
                rating: r.rating.and_then(|v| v.to_f64()).unwrap_or(0.0),
                reviews: r.reviews.unwrap_or(0),
            })
        })
        .collect();
    top.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.name.cmp(&b.name)));
    top.truncate(TOP_COMPETITORS);

    GridPointView {
        lat: point.lat,
        lng: point.lng,
        grid_row: row,
        grid_col: col,
        total_results: cell.total_businesses.unwrap_or(0),
        top_competitors: top,
        target_rank: target.map(|t| t.rank_among(results)),
        sampled: true,
    }
}

fn cell_point(cell: &CellRecord) -> Option<GridPoint> {
    let lat = decimal_to_f64("lat", cell.lat).ok()?;
    let lng = decimal_to_f64("lng", cell.lng).ok()?;
    (lat.abs() <= 90.0 && lng.abs() <= 180.0).then_some(GridPoint { lat, lng })
}
