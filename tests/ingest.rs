use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tempfile::tempdir;

use fc25_scout::dataset::load_dataset;
use fc25_scout::model::Position;
use fc25_scout::store;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn temp_db() -> (tempfile::TempDir, rusqlite::Connection) {
    let dir = tempdir().expect("temp dir should be creatable");
    let conn = store::open_db(&dir.path().join("players.sqlite")).expect("db should open");
    (dir, conn)
}

#[test]
fn loads_fixture_and_skips_broken_row() {
    let (_dir, mut conn) = temp_db();
    let summary = load_dataset(&mut conn, &fixture_path("players.csv")).expect("load should work");

    assert_eq!(summary.rows_read, 12);
    assert_eq!(summary.records_loaded, 11);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(store::count_players(&conn).unwrap(), 11);

    let all = store::load_all_players(&conn).unwrap();
    assert_eq!(all.len(), 11);
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn double_load_is_idempotent() {
    let (_dir, mut conn) = temp_db();
    let path = fixture_path("players.csv");
    load_dataset(&mut conn, &path).expect("first load");
    let summary = load_dataset(&mut conn, &path).expect("second load");

    assert_eq!(summary.records_loaded, 11);
    // Same identifiers, so the store replaces instead of duplicating.
    assert_eq!(store::count_players(&conn).unwrap(), 11);
}

#[test]
fn normalized_fields_survive_the_store() {
    let (_dir, mut conn) = temp_db();
    load_dataset(&mut conn, &fixture_path("players.csv")).expect("load should work");

    let mbappe = store::get_player(&conn, 231747)
        .expect("query should work")
        .expect("player should exist");
    assert_eq!(mbappe.name, "Kylian Mbappe");
    assert_eq!(mbappe.nationality, "France");
    assert_eq!(mbappe.position, Position::St);
    assert_eq!(mbappe.market_value, 160_000_000);
    assert_eq!(mbappe.wage, 350_000);
    assert_eq!(mbappe.release_clause, 250_500_000);
    assert_eq!(
        mbappe.contract_expiry,
        NaiveDate::from_ymd_opt(2029, 6, 30)
    );
    // The fixture has no granular attribute columns.
    assert_eq!(mbappe.attributes, None);

    // Year-only contract dates resolve to the end of that year.
    let de_bruyne = store::get_player(&conn, 192985).unwrap().unwrap();
    assert_eq!(
        de_bruyne.contract_expiry,
        NaiveDate::from_ymd_opt(2027, 12, 31)
    );
    assert_eq!(de_bruyne.release_clause, 0);

    let free_agent = store::get_player(&conn, 199999).unwrap().unwrap();
    assert_eq!(free_agent.club, None);
    assert_eq!(free_agent.league, None);
    assert_eq!(free_agent.market_value, 0);
}

#[test]
fn distinct_leagues_excludes_free_agents() {
    let (_dir, mut conn) = temp_db();
    load_dataset(&mut conn, &fixture_path("players.csv")).expect("load should work");

    let leagues = store::distinct_leagues(&conn).expect("query should work");
    assert_eq!(
        leagues,
        vec!["La Liga", "Ligue 1", "MLS", "Premier League", "Serie A"]
    );
}

#[test]
fn missing_file_is_an_error() {
    let (_dir, mut conn) = temp_db();
    let err = load_dataset(&mut conn, &fixture_path("does_not_exist.csv"));
    assert!(err.is_err());
}

#[test]
fn header_only_file_is_an_error() {
    let (dir, mut conn) = temp_db();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "player_id,name,overall_rating\n").expect("write should work");

    let err = load_dataset(&mut conn, &path);
    assert!(err.is_err());
    assert_eq!(store::count_players(&conn).unwrap(), 0);
}
