//! Grid search command handlers for the CLI.
//!
//! Everything here is read-only: searches are loaded from the database,
//! aggregated in-process, and printed to stdout.

use gridrank_core::{SearchRecord, TargetMatch};
use gridrank_db::{DbError, GridSearchRow, SearchFilter};
use gridrank_engine::{
    aggregate, business_ranks, grid_summary, response::format_success_rate, AggregateOptions,
    GridData, GridSpec, VisibilityReport,
};

use crate::SearchSelector;

/// Show the newest searches as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_recent(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let rows = gridrank_db::list_recent_grid_searches(pool, limit.max(1)).await?;

    if rows.is_empty() {
        println!("no grid searches found");
        return Ok(());
    }

    println!(
        "{:<38}{:<18}{:<22}{:<9}{:<18}TARGET",
        "ID", "CREATED", "SEARCH TERM", "SUCCESS", "CITY"
    );
    for row in &rows {
        println!(
            "{:<38}{:<18}{:<22}{:<9}{:<18}{}",
            row.id,
            row.created_at.format("%Y-%m-%d %H:%M"),
            clip(&row.search_term, 20),
            format_success_rate(row.success_rate),
            clip(&location(row.city.as_deref(), row.state.as_deref()), 16),
            row.initiated_by_name.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Print the aggregated grid of a search as pretty JSON.
///
/// # Errors
///
/// Returns an error if no search matches, the database query fails, or the
/// stored search cannot be aggregated.
pub(crate) async fn run_show(
    pool: &sqlx::PgPool,
    selector: &SearchSelector,
    target_match: TargetMatch,
) -> anyhow::Result<()> {
    let (_, data) = load_aggregation(pool, selector, target_match).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

/// Print a visibility report for one business.
///
/// Falls back to the search's target business when `business` is `None`.
///
/// # Errors
///
/// Returns an error if no search matches, no business can be chosen, or the
/// business is not among the published competitors.
pub(crate) async fn run_report(
    pool: &sqlx::PgPool,
    selector: &SearchSelector,
    business: Option<&str>,
    target_match: TargetMatch,
) -> anyhow::Result<()> {
    let (search, data) = load_aggregation(pool, selector, target_match).await?;

    let name = business
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .or_else(|| search.target_name())
        .ok_or_else(|| {
            anyhow::anyhow!("search {} has no target business; pass --business", search.id)
        })?;

    let ranks = business_ranks(&data, name).ok_or_else(|| {
        anyhow::anyhow!("'{name}' is not among the published competitors of search {}", search.id)
    })?;

    let spec = GridSpec::from_stored(search.grid_rows, search.grid_cols)?;
    let report = VisibilityReport::new(name, spec, ranks);

    println!(
        "Search: \"{}\" in {} ({})",
        search.search_term,
        location(search.city.as_deref(), search.state.as_deref()),
        search.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();
    print!("{report}");
    Ok(())
}

/// Print lattice geometry for a radius and grid size.
///
/// # Errors
///
/// Returns an error if `grid_size` is out of range.
pub(crate) fn run_grid(radius_miles: f64, grid_size: u32) -> anyhow::Result<()> {
    let summary = grid_summary(radius_miles, grid_size)?;
    println!("{:<22}{grid_size}x{grid_size}", "GRID");
    println!("{:<22}{}", "POINTS", summary.total_points);
    println!("{:<22}{:.2}", "RADIUS (mi)", summary.radius_miles);
    println!("{:<22}{:.2}", "SPACING (mi)", summary.spacing_miles);
    println!("{:<22}{:.0}", "COVERAGE (sq mi)", summary.coverage_area_sq_miles);
    println!("{:<22}{}", "MAP ZOOM", summary.zoom_level);
    Ok(())
}

async fn resolve_search(
    pool: &sqlx::PgPool,
    selector: &SearchSelector,
) -> anyhow::Result<GridSearchRow> {
    if let Some(id) = selector.id {
        return gridrank_db::get_grid_search(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("grid search {id} not found"));
    }

    let filter = SearchFilter {
        city: selector.city.clone(),
        search_term: selector.search_term.clone(),
    };
    match gridrank_db::find_latest_grid_search(pool, &filter).await {
        Ok(row) => Ok(row),
        Err(DbError::NotFound) => anyhow::bail!("no grid searches found"),
        Err(e) => Err(e.into()),
    }
}

async fn load_aggregation(
    pool: &sqlx::PgPool,
    selector: &SearchSelector,
    target_match: TargetMatch,
) -> anyhow::Result<(SearchRecord, GridData)> {
    let row = resolve_search(pool, selector).await?;
    tracing::debug!(search_id = %row.id, search_term = %row.search_term, "loading grid search");
    let snapshot = gridrank_db::load_grid_snapshot(pool, row).await?;
    let data = aggregate(&snapshot, &AggregateOptions { target_match })?;
    Ok((snapshot.search, data))
}

fn location(city: Option<&str>, state: Option<&str>) -> String {
    match (city, state) {
        (Some(c), Some(s)) => format!("{c}, {s}"),
        (Some(c), None) => c.to_string(),
        (None, Some(s)) => s.to_string(),
        (None, None) => "-".to_string(),
    }
}

fn clip(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars - 3).collect::<String>())
    } else {
        value.to_string()
    }
}
