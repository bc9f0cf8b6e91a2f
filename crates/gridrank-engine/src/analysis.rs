//! Text visibility report for a single business across a search lattice.

use std::fmt::{self, Write as _};

use gridrank_core::Rank;

use crate::geometry::GridSpec;
use crate::response::GridData;
use crate::stats::{percent, round_to_tenth, QuadrantCounts, RankStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankBand {
    Top3,
    Top10,
    Top20,
    Top50,
    Top100,
    Beyond100,
}

impl RankBand {
    pub const ALL: [RankBand; 6] = [
        RankBand::Top3,
        RankBand::Top10,
        RankBand::Top20,
        RankBand::Top50,
        RankBand::Top100,
        RankBand::Beyond100,
    ];

    #[must_use]
    pub fn of(position: u32) -> Self {
        match position {
            0..=3 => Self::Top3,
            4..=10 => Self::Top10,
            11..=20 => Self::Top20,
            21..=50 => Self::Top50,
            51..=100 => Self::Top100,
            _ => Self::Beyond100,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Top3 => "1-3",
            Self::Top10 => "4-10",
            Self::Top20 => "11-20",
            Self::Top50 => "21-50",
            Self::Top100 => "51-100",
            Self::Beyond100 => "100+",
        }
    }
}

impl fmt::Display for RankBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandCount {
    pub band: RankBand,
    /// `(row, col)` of each point in the band, best rank first.
    pub positions: Vec<(u32, u32)>,
    pub percent_of_grid: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityReport {
    pub business: String,
    pub spec: GridSpec,
    pub ranks: Vec<Rank>,
    pub stats: RankStats,
    pub quadrants: QuadrantCounts,
    /// Only bands with at least one point, in band order.
    pub bands: Vec<BandCount>,
}

impl VisibilityReport {
    /// `ranks` holds one entry per lattice position in row-major order.
    #[must_use]
    pub fn new(business: impl Into<String>, spec: GridSpec, ranks: Vec<Rank>) -> Self {
        let stats = RankStats::from_ranks(&ranks);
        let quadrants = QuadrantCounts::from_ranks(spec, &ranks);

        let mut found: Vec<(u32, u32, u32)> = ranks
            .iter()
            .enumerate()
            .filter_map(|(index, rank)| {
                let (row, col) = spec.position(index)?;
                rank.position().map(|p| (p, row, col))
            })
            .collect();
        found.sort_unstable();

        let bands = RankBand::ALL
            .into_iter()
            .filter_map(|band| {
                let positions: Vec<(u32, u32)> = found
                    .iter()
                    .filter(|(p, _, _)| RankBand::of(*p) == band)
                    .map(|&(_, row, col)| (row, col))
                    .collect();
                (!positions.is_empty()).then(|| BandCount {
                    band,
                    percent_of_grid: percent(positions.len(), ranks.len()),
                    positions,
                })
            })
            .collect();

        Self {
            business: business.into(),
            spec,
            ranks,
            stats,
            quadrants,
            bands,
        }
    }

    #[must_use]
    pub fn not_showing(&self) -> usize {
        self.stats.total_points - self.stats.appearances
    }

    #[must_use]
    pub fn heat_grid(&self) -> String {
        render_heat_grid(self.spec, &self.ranks)
    }
}

impl fmt::Display for VisibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        writeln!(f, "=== {} ===", self.business)?;
        writeln!(
            f,
            "Visible in: {}/{} grid points ({:.1}%)",
            s.appearances, s.total_points, s.coverage_percent
        )?;
        writeln!(
            f,
            "Not showing in: {} grid points ({:.1}%)",
            self.not_showing(),
            percent(self.not_showing(), s.total_points)
        )?;

        writeln!(f, "\nRANK DISTRIBUTION")?;
        for band in &self.bands {
            writeln!(
                f,
                "Rank {:<7} {:>4} points ({:.1}% of grid)",
                band.band.label(),
                band.positions.len(),
                band.percent_of_grid
            )?;
            let shown: Vec<String> = band
                .positions
                .iter()
                .take(5)
                .map(|(row, col)| format!("({row},{col})"))
                .collect();
            let more = band.positions.len().saturating_sub(shown.len());
            if more > 0 {
                writeln!(f, "  {} ... and {more} more", shown.join(", "))?;
            } else {
                writeln!(f, "  {}", shown.join(", "))?;
            }
        }

        writeln!(f, "\nPERFORMANCE")?;
        writeln!(f, "Best Rank:    {}", rank_text(s.best_rank))?;
        writeln!(f, "Worst Rank:   {}", rank_text(s.worst_rank))?;
        writeln!(f, "Median Rank:  {}", rank_text(s.median_rank))?;
        match s.avg_rank {
            Some(avg) => writeln!(f, "Average Rank: #{:.1}", round_to_tenth(avg))?,
            None => writeln!(f, "Average Rank: -")?,
        }
        writeln!(
            f,
            "Top 3: {}  Top 10: {}  #1: {}",
            s.top3_count, s.top10_count, s.first_place_count
        )?;

        let q = &self.quadrants;
        writeln!(f, "\nQUADRANTS")?;
        writeln!(
            f,
            "North: {}  South: {}  East: {}  West: {}  Center: {}",
            q.north, q.south, q.east, q.west, q.center
        )?;

        writeln!(f, "\nGRID")?;
        f.write_str(&self.heat_grid())
    }
}

fn rank_text(rank: Option<u32>) -> String {
    rank.map_or_else(|| "-".to_string(), |r| format!("#{r}"))
}

/// Single-character heat map symbol for a rank.
#[must_use]
pub fn glyph(rank: Rank) -> char {
    match rank.position() {
        None => '•',
        Some(1..=3) => '◆',
        Some(4..=10) => '▪',
        Some(11..=20) => '○',
        Some(_) => '·',
    }
}

/// Text heat map with column and row headers and a legend line.
#[must_use]
pub fn render_heat_grid(spec: GridSpec, ranks: &[Rank]) -> String {
    let mut out = String::from("  ");
    for col in 0..spec.cols {
        let _ = write!(out, " {}", col % 10);
    }
    out.push('\n');

    for row in 0..spec.rows {
        let _ = write!(out, "{row:>2}");
        for col in 0..spec.cols {
            let rank = spec
                .index(row, col)
                .and_then(|i| ranks.get(i).copied())
                .unwrap_or(Rank::NotFound);
            let _ = write!(out, " {}", glyph(rank));
        }
        out.push('\n');
    }

    out.push_str("\nLegend: ◆=Top 3, ▪=4-10, ○=11-20, ·=21+, •=Not found\n");
    out
}

/// Per-point ranks of `business` in an aggregation.
///
/// The target business reads the grid's target ranks, which honor place id
/// and word matching and rank missing cells as not found, so the report
/// agrees with `targetBusiness`. Other businesses read their matrix row.
#[must_use]
pub fn business_ranks(data: &GridData, business: &str) -> Option<Vec<Rank>> {
    let is_target = data
        .target_business
        .as_ref()
        .is_some_and(|t| t.name == business);
    if is_target {
        return Some(
            data.grid_points
                .iter()
                .map(|p| p.target_rank.unwrap_or(Rank::NotFound))
                .collect(),
        );
    }
    data.competitor_rank_matrix
        .get(business)
        .map(<[Rank]>::to_vec)
}
