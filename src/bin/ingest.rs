use std::path::PathBuf;

use anyhow::{Context, Result};

use fc25_scout::{dataset, stats, store};

fn main() -> Result<()> {
    env_logger::init();

    let csv_path = parse_path_arg("--csv").context("missing --csv <dataset.csv> argument")?;
    let db_path = parse_path_arg("--db")
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;

    let mut conn = store::open_db(&db_path)?;
    let summary = dataset::load_dataset_with_progress(&mut conn, &csv_path, |rows| {
        println!("  ... {rows} rows read");
    })?;

    println!("Dataset ingest complete");
    println!("DB: {}", db_path.display());
    println!("CSV: {}", summary.csv_path.display());
    println!(
        "Rows: {} read, {} loaded, {} skipped",
        summary.rows_read, summary.records_loaded, summary.rows_skipped
    );

    let db_stats = stats::compute_stats(&conn)?;
    println!("Players in store: {}", db_stats.total_players);
    println!(
        "Averages: rating {:.1}, value {}, age {:.1}",
        db_stats.average_rating, db_stats.average_value, db_stats.average_age
    );

    Ok(())
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    let prefix = format!("{flag}=");
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
