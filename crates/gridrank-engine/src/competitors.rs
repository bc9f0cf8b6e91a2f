//! Competitor deduplication, the rank matrix, and published competitor stats.

use std::collections::HashMap;

use gridrank_core::{CompetitorRecord, PointResultRecord, Rank, TOP_COMPETITORS};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::stats::{round_to_tenth, RankStats};

/// Name prefixes of scraped link text that was mistaken for a business.
pub const UI_ARTIFACT_PREFIXES: [&str; 6] = [
    "Visit ",
    "Get directions",
    "Call ",
    "Save ",
    "Share ",
    "Website ",
];

#[must_use]
pub fn is_ui_artifact(name: &str) -> bool {
    UI_ARTIFACT_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Drop UI artifacts and merge duplicate names, ordered by stored coverage.
///
/// A later duplicate replaces an earlier one only with strictly greater
/// coverage; it inherits the earlier one's position so ties stay stable.
#[must_use]
pub fn dedupe_competitors(records: &[CompetitorRecord]) -> Vec<&CompetitorRecord> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<&CompetitorRecord> = Vec::new();

    for record in records.iter().filter(|r| !is_ui_artifact(&r.name)) {
        match slots.get(record.name.as_str()) {
            Some(&slot) => {
                if stored_coverage(record) > stored_coverage(kept[slot]) {
                    kept[slot] = record;
                }
            }
            None => {
                slots.insert(record.name.as_str(), kept.len());
                kept.push(record);
            }
        }
    }

    let merged = records.len() - kept.len();
    if merged > 0 {
        tracing::debug!(merged, "dropped duplicate or artifact competitor rows");
    }

    kept.sort_by(|a, b| stored_coverage(b).cmp(&stored_coverage(a)));
    kept
}

fn stored_coverage(record: &CompetitorRecord) -> Decimal {
    record.coverage_percent.unwrap_or(Decimal::ZERO)
}

/// Per-competitor ranks across every lattice position.
///
/// Rows keep the order of the names they were built from. Serializes as a
/// JSON object of `name -> [rank; total_points]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankMatrix {
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq)]
struct MatrixRow {
    name: String,
    ranks: Vec<Rank>,
    observed: bool,
}

impl RankMatrix {
    /// Fold point results into a not-found matrix for `names`.
    ///
    /// Results for other names or outside `0..total_points` are ignored. When
    /// one name is ranked twice at the same point the better rank wins.
    #[must_use]
    pub fn build(names: &[&str], total_points: usize, results: &[PointResultRecord]) -> Self {
        let lookup: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(row, name)| (*name, row))
            .collect();

        let initial: Vec<MatrixRow> = names
            .iter()
            .map(|name| MatrixRow {
                name: (*name).to_string(),
                ranks: vec![Rank::NotFound; total_points],
                observed: false,
            })
            .collect();

        let rows = results
            .iter()
            .filter_map(|r| {
                let row = *lookup.get(r.competitor_name.as_str())?;
                let cell = usize::try_from(r.grid_index)
                    .ok()
                    .filter(|&i| i < total_points)?;
                Some((row, cell, Rank::from_stored(r.rank_position)))
            })
            .fold(initial, |mut rows, (row, cell, rank)| {
                let entry = &mut rows[row];
                entry.ranks[cell] = entry.ranks[cell].best(rank);
                entry.observed = true;
                rows
            });

        Self { rows }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Rank]> {
        self.row(name).map(|r| r.ranks.as_slice())
    }

    /// Whether any point result was recorded for `name`.
    #[must_use]
    pub fn observed(&self, name: &str) -> bool {
        self.row(name).is_some_and(|r| r.observed)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the rows for `names`, in that order.
    #[must_use]
    pub fn select(self, names: &[&str]) -> Self {
        let mut by_name: HashMap<String, MatrixRow> =
            self.rows.into_iter().map(|r| (r.name.clone(), r)).collect();
        let rows = names.iter().filter_map(|n| by_name.remove(*n)).collect();
        Self { rows }
    }

    fn row(&self, name: &str) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

impl Serialize for RankMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for row in &self.rows {
            map.serialize_entry(&row.name, &row.ranks)?;
        }
        map.end()
    }
}

/// A competitor as published in the aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorView {
    pub name: String,
    pub place_id: Option<String>,
    pub rating: f64,
    pub reviews: i32,
    pub appearances: u32,
    #[serde(rename = "avgRank")]
    pub avg_rank: f64,
    pub coverage: f64,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedCompetitors {
    pub competitors: Vec<CompetitorView>,
    pub matrix: RankMatrix,
}

/// Select the published competitors and build their rank matrix.
///
/// `sampled` holds one flag per lattice position; stats for a competitor
/// with point results count only sampled positions, so they agree with the
/// reconstructed grid. Competitors without point results publish their
/// stored stats. The list is ordered by the published coverage (stored order
/// breaks ties) and cut to the top 20.
#[must_use]
pub fn publish_competitors(
    records: &[CompetitorRecord],
    sampled: &[bool],
    results: &[PointResultRecord],
) -> PublishedCompetitors {
    let deduped = dedupe_competitors(records);
    let names: Vec<&str> = deduped.iter().map(|r| r.name.as_str()).collect();
    let matrix = RankMatrix::build(&names, sampled.len(), results);

    let mut competitors: Vec<CompetitorView> = deduped
        .into_iter()
        .map(|record| {
            let derived = matrix
                .get(&record.name)
                .filter(|_| matrix.observed(&record.name))
                .map(|ranks| RankStats::from_ranks(&sampled_ranks(ranks, sampled)));
            view(record, derived.as_ref())
        })
        .collect();
    competitors.sort_by(|a, b| b.coverage.total_cmp(&a.coverage));
    competitors.truncate(TOP_COMPETITORS);

    let published: Vec<&str> = competitors.iter().map(|c| c.name.as_str()).collect();
    let matrix = matrix.select(&published);

    PublishedCompetitors {
        competitors,
        matrix,
    }
}

fn sampled_ranks(ranks: &[Rank], sampled: &[bool]) -> Vec<Rank> {
    ranks
        .iter()
        .zip(sampled)
        .map(|(&rank, &seen)| if seen { rank } else { Rank::NotFound })
        .collect()
}

fn view(record: &CompetitorRecord, derived: Option<&RankStats>) -> CompetitorView {
    let (appearances, avg_rank, coverage) = match derived {
        Some(stats) => (
            u32::try_from(stats.appearances).unwrap_or(u32::MAX),
            stats
                .avg_rank
                .unwrap_or(f64::from(Rank::NotFound.to_wire())),
            stats.coverage_percent,
        ),
        None => (
            record
                .appearances
                .and_then(|a| u32::try_from(a).ok())
                .unwrap_or(0),
            to_f64(record.avg_rank).unwrap_or(f64::from(Rank::NotFound.to_wire())),
            to_f64(record.coverage_percent).unwrap_or(0.0),
        ),
    };

    CompetitorView {
        name: record.name.clone(),
        place_id: record.place_id.clone(),
        rating: to_f64(record.rating).unwrap_or(0.0),
        reviews: record.reviews.unwrap_or(0),
        appearances,
        avg_rank: round_to_tenth(avg_rank),
        coverage: round_to_tenth(coverage),
        address: record.address.clone(),
        lat: to_f64(record.business_lat),
        lng: to_f64(record.business_lng),
    }
}

fn to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|v| v.to_f64()).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn competitor(name: &str, coverage: i64) -> CompetitorRecord {
        CompetitorRecord {
            id: Uuid::nil(),
            place_id: None,
            name: name.to_string(),
            rating: Some(Decimal::new(45, 1)),
            reviews: Some(120),
            appearances: Some(10),
            coverage_percent: Some(Decimal::new(coverage, 0)),
            avg_rank: Some(Decimal::new(52, 1)),
            address: None,
            business_lat: None,
            business_lng: None,
        }
    }

    fn hit(name: &str, grid_index: i32, rank: i32) -> PointResultRecord {
        PointResultRecord {
            competitor_id: Uuid::nil(),
            competitor_name: name.to_string(),
            competitor_place_id: None,
            grid_index,
            rank_position: rank,
            rating: None,
            reviews: None,
        }
    }

    #[test]
    fn ui_artifacts_are_prefix_matched() {
        assert!(is_ui_artifact("Visit Website"));
        assert!(is_ui_artifact("Get directions to Acme"));
        assert!(is_ui_artifact("Call (512) 555-0100"));
        assert!(!is_ui_artifact("Calloway Dental"));
        assert!(!is_ui_artifact("visit website"));
    }

    #[test]
    fn higher_coverage_duplicate_wins() {
        let rows = [competitor("Acme Spa", 40), competitor("Acme Spa", 55)];
        let kept = dedupe_competitors(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].coverage_percent, Some(Decimal::new(55, 0)));
    }

    #[test]
    fn equal_coverage_keeps_first_row() {
        let mut second = competitor("Acme Spa", 40);
        second.reviews = Some(7);
        let rows = [competitor("Acme Spa", 40), second];
        assert_eq!(dedupe_competitors(&rows)[0].reviews, Some(120));
    }

    #[test]
    fn dedupe_orders_by_stored_coverage_with_stable_ties() {
        let mut rows: Vec<CompetitorRecord> =
            (0..25).map(|i| competitor(&format!("Biz {i:02}"), i)).collect();
        rows.push(competitor("Tie A", 30));
        rows.push(competitor("Tie B", 30));
        let kept = dedupe_competitors(&rows);
        assert_eq!(kept.len(), 27);
        assert_eq!(kept[0].name, "Tie A");
        assert_eq!(kept[1].name, "Tie B");
        assert_eq!(kept[2].name, "Biz 24");
    }

    #[test]
    fn publishes_top_twenty_by_stored_coverage_without_results() {
        let rows: Vec<CompetitorRecord> =
            (0..25).map(|i| competitor(&format!("Biz {i:02}"), i)).collect();
        let published = publish_competitors(&rows, &[true; 9], &[]);
        assert_eq!(published.competitors.len(), 20);
        assert_eq!(published.competitors[0].name, "Biz 24");
        assert_eq!(published.competitors[19].name, "Biz 05");
        assert_eq!(published.matrix.len(), 20);
    }

    #[test]
    fn published_list_is_ordered_by_published_coverage() {
        let rows = [competitor("Acme Spa", 90), competitor("Zen Spa", 50)];
        let mut results = vec![hit("Acme Spa", 0, 1)];
        results.extend((0..5).map(|i| hit("Zen Spa", i, 2)));
        let published = publish_competitors(&rows, &[true; 10], &results);

        let names: Vec<&str> = published.competitors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Zen Spa", "Acme Spa"]);
        assert!(published
            .competitors
            .windows(2)
            .all(|w| w[0].coverage >= w[1].coverage));
        assert_eq!(published.matrix.names().collect::<Vec<_>>(), names);
    }

    #[test]
    fn high_observed_coverage_survives_the_cut() {
        let mut rows: Vec<CompetitorRecord> =
            (0..20).map(|i| competitor(&format!("Biz {i:02}"), 60 + i)).collect();
        rows.push(competitor("Late Spa", 1));
        let results: Vec<PointResultRecord> = (0..8).map(|i| hit("Late Spa", i, 3)).collect();
        let published = publish_competitors(&rows, &[true; 10], &results);

        assert_eq!(published.competitors.len(), 20);
        assert!(published.competitors.iter().any(|c| c.name == "Late Spa"));
        assert!(published.matrix.get("Late Spa").is_some());
    }

    #[test]
    fn derived_stats_skip_unsampled_positions() {
        let rows = [competitor("Acme Spa", 90)];
        let results = [hit("Acme Spa", 0, 1), hit("Acme Spa", 2, 2)];
        let published = publish_competitors(&rows, &[true, true, false, true], &results);

        let acme = &published.competitors[0];
        assert_eq!(acme.appearances, 1);
        assert!((acme.coverage - 25.0).abs() < 1e-9);
        assert!((acme.avg_rank - 1.0).abs() < 1e-9);
        assert_eq!(published.matrix.get("Acme Spa").unwrap()[2], Rank::Found(2));
    }

    #[test]
    fn select_keeps_requested_rows_in_order() {
        let m = RankMatrix::build(&["A", "B", "C"], 2, &[hit("C", 1, 4)]);
        let picked = m.select(&["C", "A"]);
        assert_eq!(picked.names().collect::<Vec<_>>(), ["C", "A"]);
        assert_eq!(picked.get("C").unwrap()[1], Rank::Found(4));
        assert!(picked.get("B").is_none());
    }

    #[test]
    fn matrix_fold_keeps_best_rank_regardless_of_order() {
        let forward = [hit("Acme", 3, 7), hit("Acme", 3, 2), hit("Other", 3, 1)];
        let mut backward = forward.clone();
        backward.reverse();

        let a = RankMatrix::build(&["Acme"], 9, &forward);
        let b = RankMatrix::build(&["Acme"], 9, &backward);
        assert_eq!(a, b);
        assert_eq!(a.get("Acme").unwrap()[3], Rank::Found(2));
        assert_eq!(a.get("Other"), None);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn matrix_ignores_out_of_range_indices() {
        let m = RankMatrix::build(&["Acme"], 4, &[hit("Acme", 4, 1), hit("Acme", -1, 1)]);
        assert!(m.get("Acme").unwrap().iter().all(|r| *r == Rank::NotFound));
        assert!(!m.observed("Acme"));
    }

    #[test]
    fn matrix_serializes_in_row_order_with_sentinel() {
        let m = RankMatrix::build(&["Zed", "Alpha"], 3, &[hit("Zed", 1, 4)]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"Zed":[999,4,999],"Alpha":[999,999,999]}"#);
    }

    #[test]
    fn derived_stats_exclude_sentinel() {
        let rows = [competitor("Acme Spa", 90)];
        let results = [hit("Acme Spa", 0, 1), hit("Acme Spa", 1, 999), hit("Acme Spa", 2, 3)];
        let published = publish_competitors(&rows, &[true; 3], &results);

        let acme = &published.competitors[0];
        assert!((acme.avg_rank - 2.0).abs() < 1e-9);
        assert_eq!(acme.appearances, 2);
        assert!((acme.coverage - 66.7).abs() < 1e-9);
    }

    #[test]
    fn stored_stats_used_without_point_results() {
        let published = publish_competitors(&[competitor("Acme Spa", 40)], &[true; 169], &[]);
        let acme = &published.competitors[0];
        assert_eq!(acme.appearances, 10);
        assert!((acme.avg_rank - 5.2).abs() < 1e-9);
        assert!((acme.coverage - 40.0).abs() < 1e-9);
        assert!((acme.rating - 4.5).abs() < 1e-9);
    }

    #[test]
    fn all_sentinel_results_publish_not_found_stats() {
        let published =
            publish_competitors(&[competitor("Acme Spa", 40)], &[true; 4], &[hit("Acme Spa", 0, 999)]);
        let acme = &published.competitors[0];
        assert_eq!(acme.appearances, 0);
        assert!(acme.coverage.abs() < f64::EPSILON);
        assert!((acme.avg_rank - 999.0).abs() < f64::EPSILON);
    }
}
