use std::path::PathBuf;

use tempfile::tempdir;

use fc25_scout::continents::Continent;
use fc25_scout::dataset::load_dataset;
use fc25_scout::model::{PlayerAttributes, PlayerRecord, Position};
use fc25_scout::stats::{compute_stats, continent_counts};
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

fn record(id: i64, position: Position, rating: u8, age: u8, value: i64) -> PlayerRecord {
    PlayerRecord {
        id,
        name: format!("Player {id}"),
        age,
        nationality: "Unknown".to_string(),
        club: None,
        league: None,
        position,
        preferred_foot: "Right".to_string(),
        overall_rating: rating,
        potential: rating,
        market_value: value,
        wage: 0,
        release_clause: 0,
        attributes: None,
        contract_expiry: None,
        last_updated: "2025-06-01T00:00:00+00:00".to_string(),
    }
}

#[test]
fn averages_are_count_weighted_across_positions() {
    let (_dir, conn) = temp_db();
    // Two strikers at 90 and eight centre-backs at 70: a naive
    // average-of-group-averages would claim 80, the true mean is 74.
    for id in 1..=2 {
        store::upsert_player(&conn, &record(id, Position::St, 90, 20, 10_000_000)).unwrap();
    }
    for id in 3..=10 {
        store::upsert_player(&conn, &record(id, Position::Cb, 70, 25, 1_000_000)).unwrap();
    }

    let stats = compute_stats(&conn).unwrap();
    assert_eq!(stats.total_players, 10);
    assert_eq!(stats.average_rating, 74.0);
    assert_eq!(stats.average_age, 24.0);
    assert_eq!(stats.average_value, 2_800_000);
    assert_eq!(
        stats.position_counts,
        vec![(Position::Cb, 8), (Position::St, 2)]
    );
}

#[test]
fn empty_store_yields_zeroed_stats() {
    let (_dir, conn) = temp_db();
    let stats = compute_stats(&conn).unwrap();
    assert_eq!(stats.total_players, 0);
    assert_eq!(stats.average_rating, 0.0);
    assert!(stats.position_counts.is_empty());
}

#[test]
fn fixture_stats_cover_every_present_position() {
    let (_dir, mut conn) = temp_db();
    load_dataset(&mut conn, &fixture_path("players.csv")).expect("fixture should load");

    let stats = compute_stats(&conn).unwrap();
    assert_eq!(stats.total_players, 11);
    let total_from_groups: usize = stats.position_counts.iter().map(|(_, n)| n).sum();
    assert_eq!(total_from_groups, 11);
    // Positions with zero records are omitted, not reported as zero.
    assert!(stats.position_counts.iter().all(|(_, n)| *n > 0));
}

#[test]
fn continent_counts_bucket_and_sort() {
    let (_dir, mut conn) = temp_db();
    load_dataset(&mut conn, &fixture_path("players.csv")).expect("fixture should load");

    let counts = continent_counts(&conn).unwrap();
    assert_eq!(
        counts,
        vec![
            (Continent::Europe, 6),
            (Continent::SouthAmerica, 2),
            (Continent::Africa, 1),
            (Continent::Asia, 1),
        ]
    );
}

#[test]
fn attribute_blob_round_trips_through_the_store() {
    let (_dir, conn) = temp_db();

    let mut with_attrs = record(1, Position::Rw, 88, 24, 60_000_000);
    with_attrs.attributes = Some(PlayerAttributes {
        pace: 93,
        shooting: 82,
        passing: 78,
        dribbling: 90,
        defending: 35,
        physical: 70,
    });
    store::upsert_player(&conn, &with_attrs).unwrap();
    store::upsert_player(&conn, &record(2, Position::Cb, 80, 28, 30_000_000)).unwrap();

    let loaded = store::get_player(&conn, 1).unwrap().unwrap();
    assert_eq!(loaded.attributes, with_attrs.attributes);

    let without = store::get_player(&conn, 2).unwrap().unwrap();
    assert_eq!(without.attributes, None);
}
