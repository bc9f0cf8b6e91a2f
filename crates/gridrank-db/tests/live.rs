//! Live integration tests for gridrank-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/gridrank-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory. Run with `--ignored` and `DATABASE_URL` set.

use gridrank_db::{
    find_latest_grid_search, get_grid_search, list_grid_cells, list_grid_competitors,
    list_grid_point_results, list_recent_grid_searches, load_grid_snapshot, DbError,
    SearchFilter,
};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_search(pool: &sqlx::PgPool, city: &str, term: &str, age_minutes: i32) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO grid_searches \
            (search_term, center_lat, center_lng, city, state, initiated_by_name, \
             success_rate, execution_time_seconds, created_at) \
         VALUES ($1, 30.2672, -97.7431, $2, 'TX', 'Acme Spa', 97.5, 420, \
                 now() - make_interval(mins => $3)) \
         RETURNING id",
    )
    .bind(term)
    .bind(city)
    .bind(age_minutes)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_search failed for {city}/{term}: {e}"))
}

async fn insert_competitor(
    pool: &sqlx::PgPool,
    search_id: Uuid,
    name: &str,
    coverage: Decimal,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO grid_competitors (search_id, place_id, name, rating, reviews, coverage_percent) \
         VALUES ($1, $2, $3, 4.6, 120, $4) \
         RETURNING id",
    )
    .bind(search_id)
    .bind(format!("place-{name}"))
    .bind(name)
    .bind(coverage)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_competitor failed for '{name}': {e}"))
}

async fn insert_point_result(
    pool: &sqlx::PgPool,
    search_id: Uuid,
    competitor_id: Uuid,
    grid_index: i32,
    rank: i32,
) {
    sqlx::query(
        "INSERT INTO grid_point_results \
            (search_id, competitor_id, grid_row, grid_col, grid_index, lat, lng, rank_position) \
         VALUES ($1, $2, $3 / 13, $3 % 13, $3, 30.2672, -97.7431, $4)",
    )
    .bind(search_id)
    .bind(competitor_id)
    .bind(grid_index)
    .bind(rank)
    .execute(pool)
    .await
    .expect("insert_point_result failed");
}

async fn insert_cell(pool: &sqlx::PgPool, search_id: Uuid, row: i32, col: i32) {
    sqlx::query(
        "INSERT INTO grid_cells (search_id, grid_row, grid_col, lat, lng, total_businesses) \
         VALUES ($1, $2, $3, 30.2672, -97.7431, 18)",
    )
    .bind(search_id)
    .bind(row)
    .bind(col)
    .execute(pool)
    .await
    .expect("insert_cell failed");
}

// ---------------------------------------------------------------------------
// grid_searches
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn latest_search_respects_case_insensitive_filters(pool: sqlx::PgPool) {
    let austin_old = insert_search(&pool, "Austin", "med spa", 60).await;
    let austin_new = insert_search(&pool, "Austin", "dentist", 5).await;
    let dallas = insert_search(&pool, "Dallas", "med spa", 1).await;

    let latest = find_latest_grid_search(&pool, &SearchFilter::default())
        .await
        .expect("unfiltered lookup failed");
    assert_eq!(latest.id, dallas);

    let by_city = find_latest_grid_search(
        &pool,
        &SearchFilter {
            city: Some("austin".to_string()),
            search_term: None,
        },
    )
    .await
    .expect("city lookup failed");
    assert_eq!(by_city.id, austin_new);

    let by_both = find_latest_grid_search(
        &pool,
        &SearchFilter {
            city: Some("AUSTIN".to_string()),
            search_term: Some("Med Spa".to_string()),
        },
    )
    .await
    .expect("city + term lookup failed");
    assert_eq!(by_both.id, austin_old);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn latest_search_reports_not_found_on_empty_table(pool: sqlx::PgPool) {
    let err = find_latest_grid_search(&pool, &SearchFilter::default())
        .await
        .expect_err("empty table should not yield a search");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn get_and_list_searches(pool: sqlx::PgPool) {
    let first = insert_search(&pool, "Austin", "med spa", 30).await;
    let second = insert_search(&pool, "Austin", "med spa", 10).await;

    let fetched = get_grid_search(&pool, first)
        .await
        .expect("get failed")
        .expect("search should exist");
    assert_eq!(fetched.search_term, "med spa");
    assert_eq!(fetched.grid_rows, Some(13));
    assert_eq!(fetched.search_radius_miles, Some(Decimal::new(500, 2)));

    assert!(get_grid_search(&pool, Uuid::new_v4())
        .await
        .expect("get failed")
        .is_none());

    let recent = list_recent_grid_searches(&pool, 1)
        .await
        .expect("list failed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, second);
}

// ---------------------------------------------------------------------------
// grid_* rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn competitor_query_excludes_ui_artifacts(pool: sqlx::PgPool) {
    let search_id = insert_search(&pool, "Austin", "med spa", 0).await;
    insert_competitor(&pool, search_id, "Visit Website", Decimal::new(99, 0)).await;
    insert_competitor(&pool, search_id, "Get directions", Decimal::new(98, 0)).await;
    insert_competitor(&pool, search_id, "Acme Spa", Decimal::new(40, 0)).await;
    insert_competitor(&pool, search_id, "Calloway Aesthetics", Decimal::new(55, 0)).await;

    let rows = list_grid_competitors(&pool, search_id)
        .await
        .expect("list competitors failed");
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Calloway Aesthetics", "Acme Spa"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn point_results_join_competitor_identity(pool: sqlx::PgPool) {
    let search_id = insert_search(&pool, "Austin", "med spa", 0).await;
    let acme = insert_competitor(&pool, search_id, "Acme Spa", Decimal::new(40, 0)).await;
    let zen = insert_competitor(&pool, search_id, "Zen Spa", Decimal::new(20, 0)).await;
    insert_point_result(&pool, search_id, acme, 14, 3).await;
    insert_point_result(&pool, search_id, zen, 14, 1).await;
    insert_point_result(&pool, search_id, acme, 2, 999).await;

    let rows = list_grid_point_results(&pool, search_id)
        .await
        .expect("list point results failed");
    let seen: Vec<(i32, i32, &str)> = rows
        .iter()
        .map(|r| (r.grid_index, r.rank_position, r.competitor_name.as_str()))
        .collect();
    assert_eq!(seen, [(2, 999, "Acme Spa"), (14, 1, "Zen Spa"), (14, 3, "Acme Spa")]);
    assert_eq!(rows[0].competitor_place_id.as_deref(), Some("place-Acme Spa"));
    assert_eq!(rows[0].reviews, Some(120));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn snapshot_gathers_all_rows_for_one_search(pool: sqlx::PgPool) {
    let search_id = insert_search(&pool, "Austin", "med spa", 0).await;
    let other_id = insert_search(&pool, "Dallas", "med spa", 0).await;
    insert_cell(&pool, search_id, 0, 1).await;
    insert_cell(&pool, search_id, 0, 0).await;
    insert_cell(&pool, other_id, 0, 0).await;
    let acme = insert_competitor(&pool, search_id, "Acme Spa", Decimal::new(40, 0)).await;
    insert_point_result(&pool, search_id, acme, 0, 2).await;

    let cells = list_grid_cells(&pool, search_id).await.expect("cells failed");
    assert_eq!(
        cells.iter().map(|c| (c.grid_row, c.grid_col)).collect::<Vec<_>>(),
        [(0, 0), (0, 1)]
    );

    let search = get_grid_search(&pool, search_id)
        .await
        .expect("get failed")
        .expect("search should exist");
    let snapshot = load_grid_snapshot(&pool, search)
        .await
        .expect("load snapshot failed");

    assert_eq!(snapshot.search.id, search_id);
    assert_eq!(snapshot.search.target_name(), Some("Acme Spa"));
    assert_eq!(snapshot.cells.len(), 2);
    assert_eq!(snapshot.competitors.len(), 1);
    assert_eq!(snapshot.point_results.len(), 1);
    assert_eq!(snapshot.point_results[0].competitor_id, acme);
}
