use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use log::info;
use rusqlite::Connection;

use crate::normalize::{RawRow, normalize_row};
use crate::store::upsert_player;
use crate::tokenize::split_row;

const PROGRESS_EVERY: usize = 500;

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub csv_path: PathBuf,
    pub rows_read: usize,
    pub records_loaded: usize,
    pub rows_skipped: usize,
}

pub fn load_dataset(conn: &mut Connection, path: &Path) -> Result<LoadSummary> {
    load_dataset_with_progress(conn, path, |_| {})
}

// The whole load runs inside one transaction; a caller in a cooperative
// environment can watch row counts through the progress callback. Taking
// &mut Connection keeps two loads of the same store from overlapping.
pub fn load_dataset_with_progress(
    conn: &mut Connection,
    path: &Path,
    mut on_progress: impl FnMut(usize),
) -> Result<LoadSummary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset {}", path.display()))?;

    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    let header_line = lines
        .next()
        .ok_or_else(|| anyhow!("dataset {} is empty", path.display()))?;
    let header = header_index(header_line);

    let today = Utc::now().date_naive();
    let tx = conn.transaction().context("begin load transaction")?;

    let mut rows_read = 0usize;
    let mut records_loaded = 0usize;
    let mut rows_skipped = 0usize;

    for line in lines {
        rows_read += 1;
        let fields = split_row(line);
        let row = RawRow::new(&header, &fields);
        match normalize_row(&row, today) {
            Some(record) => {
                upsert_player(&tx, &record)?;
                records_loaded += 1;
            }
            None => rows_skipped += 1,
        }
        if rows_read % PROGRESS_EVERY == 0 {
            on_progress(rows_read);
        }
    }
    if rows_read == 0 {
        return Err(anyhow!(
            "dataset {} has a header but no data rows",
            path.display()
        ));
    }
    tx.commit().context("commit load transaction")?;

    info!(
        "loaded {records_loaded}/{rows_read} rows from {} ({rows_skipped} skipped)",
        path.display()
    );
    Ok(LoadSummary {
        csv_path: path.to_path_buf(),
        rows_read,
        records_loaded,
        rows_skipped,
    })
}

fn header_index(line: &str) -> HashMap<String, usize> {
    split_row(line)
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name.to_ascii_lowercase(), idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::header_index;

    #[test]
    fn header_is_case_insensitive_and_positional() {
        let header = header_index("Player_ID,Name,Overall_Rating");
        assert_eq!(header.get("player_id"), Some(&0));
        assert_eq!(header.get("name"), Some(&1));
        assert_eq!(header.get("overall_rating"), Some(&2));
        assert_eq!(header.get("missing"), None);
    }
}
