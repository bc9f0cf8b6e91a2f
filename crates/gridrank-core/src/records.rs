//! Stored scan data as handed to the aggregation engine.
//!
//! These mirror the `grid_*` tables but are free of any database crate, so
//! the engine can be driven from fixtures as easily as from Postgres.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// One execution of a lattice scan around a location.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    pub id: Uuid,
    pub search_term: String,
    pub center_lat: Decimal,
    pub center_lng: Decimal,
    pub search_radius_miles: Option<Decimal>,
    pub grid_rows: Option<i32>,
    pub grid_cols: Option<i32>,
    pub initiated_by_place_id: Option<String>,
    pub initiated_by_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub total_unique_businesses: Option<i32>,
    pub success_rate: Option<Decimal>,
    pub execution_time_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Trimmed, non-empty target name.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        non_blank(self.initiated_by_name.as_deref())
    }

    /// Trimmed, non-empty target place id.
    #[must_use]
    pub fn target_place_id(&self) -> Option<&str> {
        non_blank(self.initiated_by_place_id.as_deref())
    }

    /// A search is targeted when it was commissioned for a specific business.
    #[must_use]
    pub fn is_targeted(&self) -> bool {
        self.target_name().is_some() || self.target_place_id().is_some()
    }
}

/// A sampled coordinate of a search.
#[derive(Debug, Clone)]
pub struct CellRecord {
    pub grid_row: i32,
    pub grid_col: i32,
    pub lat: Decimal,
    pub lng: Decimal,
    pub total_businesses: Option<i32>,
}

/// A business observed somewhere in a search.
#[derive(Debug, Clone)]
pub struct CompetitorRecord {
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

/// The rank one competitor reached at one grid point.
#[derive(Debug, Clone)]
pub struct PointResultRecord {
    pub competitor_id: Uuid,
    pub competitor_name: String,
    pub competitor_place_id: Option<String>,
    pub grid_index: i32,
    pub rank_position: i32,
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
}

/// Everything stored for one search.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    pub search: SearchRecord,
    pub cells: Vec<CellRecord>,
    pub competitors: Vec<CompetitorRecord>,
    pub point_results: Vec<PointResultRecord>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(name: Option<&str>, place_id: Option<&str>) -> SearchRecord {
        SearchRecord {
            id: Uuid::nil(),
            search_term: "med spa".to_string(),
            center_lat: Decimal::new(302_672, 4),
            center_lng: Decimal::new(-977_431, 4),
            search_radius_miles: None,
            grid_rows: None,
            grid_cols: None,
            initiated_by_place_id: place_id.map(str::to_string),
            initiated_by_name: name.map(str::to_string),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            total_unique_businesses: None,
            success_rate: None,
            execution_time_seconds: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_target_fields_are_not_targeted() {
        assert!(!search(None, None).is_targeted());
        assert!(!search(Some("   "), Some("")).is_targeted());
    }

    #[test]
    fn target_name_is_trimmed() {
        let s = search(Some("  Acme Spa "), None);
        assert!(s.is_targeted());
        assert_eq!(s.target_name(), Some("Acme Spa"));
        assert_eq!(s.target_place_id(), None);
    }

    #[test]
    fn place_id_alone_is_targeted() {
        assert!(search(None, Some("ChIJ123")).is_targeted());
    }
}
