//! Summary statistics over a business's per-point ranks.
//!
//! Only `Rank::Found` values take part in averages and extremes; not-found
//! points count toward the total when computing coverage.

use gridrank_core::Rank;
use serde::Serialize;

use crate::geometry::GridSpec;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankStats {
    /// Points where the business was found.
    pub appearances: usize,
    pub total_points: usize,
    pub coverage_percent: f64,
    pub avg_rank: Option<f64>,
    pub best_rank: Option<u32>,
    pub worst_rank: Option<u32>,
    /// Element at `floor(n / 2)` of the sorted found ranks.
    pub median_rank: Option<u32>,
    pub top3_count: usize,
    pub top10_count: usize,
    pub first_place_count: usize,
}

impl RankStats {
    /// Statistics for one rank per grid point.
    #[must_use]
    pub fn from_ranks(ranks: &[Rank]) -> Self {
        let mut found: Vec<u32> = ranks.iter().filter_map(|r| r.position()).collect();
        found.sort_unstable();

        let appearances = found.len();
        let avg_rank = (!found.is_empty())
            .then(|| found.iter().map(|&r| f64::from(r)).sum::<f64>() / as_f64(appearances));

        Self {
            appearances,
            total_points: ranks.len(),
            coverage_percent: percent(appearances, ranks.len()),
            avg_rank,
            best_rank: found.first().copied(),
            worst_rank: found.last().copied(),
            median_rank: found.get(appearances / 2).copied(),
            top3_count: found.iter().filter(|&&r| r <= 3).count(),
            top10_count: found.iter().filter(|&&r| r <= 10).count(),
            first_place_count: found.iter().filter(|&&r| r == 1).count(),
        }
    }
}

/// Where on the lattice a business shows up.
///
/// North/south split on the center row, west/east on the center column; the
/// center block is the 3×3 square around the center point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuadrantCounts {
    pub north: usize,
    pub south: usize,
    pub east: usize,
    pub west: usize,
    pub center: usize,
}

impl QuadrantCounts {
    /// `ranks` is indexed by row-major grid index; extra entries are ignored.
    #[must_use]
    pub fn from_ranks(spec: GridSpec, ranks: &[Rank]) -> Self {
        let (center_row, center_col) = (spec.center_row(), spec.center_col());
        ranks
            .iter()
            .enumerate()
            .filter(|(_, rank)| rank.is_found())
            .filter_map(|(index, _)| spec.position(index))
            .fold(Self::default(), |mut acc, (row, col)| {
                if row < center_row {
                    acc.north += 1;
                } else if row > center_row {
                    acc.south += 1;
                }
                if col < center_col {
                    acc.west += 1;
                } else if col > center_col {
                    acc.east += 1;
                }
                if row.abs_diff(center_row) <= 1 && col.abs_diff(center_col) <= 1 {
                    acc.center += 1;
                }
                acc
            })
    }
}

/// Round to one decimal place for display.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    as_f64(part) / as_f64(whole) * 100.0
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn as_f64(n: usize) -> f64 {
    n as f64
}
