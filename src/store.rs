use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::model::{PlayerAttributes, PlayerRecord, Position};

pub fn default_db_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("players.sqlite"))
}

fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join("fc25_scout"));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("fc25_scout"),
    )
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            nationality TEXT NOT NULL,
            club TEXT NULL,
            league TEXT NULL,
            position TEXT NOT NULL,
            preferred_foot TEXT NOT NULL DEFAULT 'Right',
            overall_rating INTEGER NOT NULL,
            potential INTEGER NOT NULL,
            market_value INTEGER NOT NULL,
            wage INTEGER NOT NULL,
            release_clause INTEGER NOT NULL,
            attributes TEXT NULL,
            contract_expiry TEXT NULL,
            last_updated TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_players_position ON players(position);
        CREATE INDEX IF NOT EXISTS idx_players_overall ON players(overall_rating);
        CREATE INDEX IF NOT EXISTS idx_players_age ON players(age);
        CREATE INDEX IF NOT EXISTS idx_players_value ON players(market_value);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_player(conn: &Connection, record: &PlayerRecord) -> Result<()> {
    let attributes_json = record
        .attributes
        .map(|attrs| serde_json::to_string(&attrs).context("serialize attributes"))
        .transpose()?;

    conn.execute(
        r#"
        INSERT INTO players (
            id, name, age, nationality, club, league, position,
            preferred_foot, overall_rating, potential, market_value,
            wage, release_clause, attributes, contract_expiry, last_updated
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16
        )
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            age = excluded.age,
            nationality = excluded.nationality,
            club = excluded.club,
            league = excluded.league,
            position = excluded.position,
            preferred_foot = excluded.preferred_foot,
            overall_rating = excluded.overall_rating,
            potential = excluded.potential,
            market_value = excluded.market_value,
            wage = excluded.wage,
            release_clause = excluded.release_clause,
            attributes = excluded.attributes,
            contract_expiry = excluded.contract_expiry,
            last_updated = excluded.last_updated
        "#,
        params![
            record.id,
            record.name,
            i64::from(record.age),
            record.nationality,
            record.club,
            record.league,
            record.position.code(),
            record.preferred_foot,
            i64::from(record.overall_rating),
            i64::from(record.potential),
            record.market_value,
            record.wage,
            record.release_clause,
            attributes_json,
            record.contract_expiry.map(|d| d.to_string()),
            record.last_updated,
        ],
    )
    .context("upsert player")?;
    Ok(())
}

pub const PLAYER_COLUMNS: &str = "id, name, age, nationality, club, league, position, \
     preferred_foot, overall_rating, potential, market_value, \
     wage, release_clause, attributes, contract_expiry, last_updated";

pub fn player_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerRecord> {
    let position_code: String = row.get(6)?;
    let attributes_json: Option<String> = row.get(13)?;
    let contract_expiry: Option<String> = row.get(14)?;

    Ok(PlayerRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get::<_, i64>(2)?.clamp(0, 255) as u8,
        nationality: row.get(3)?,
        club: row.get(4)?,
        league: row.get(5)?,
        position: Position::from_code(&position_code).unwrap_or(Position::Cm),
        preferred_foot: row.get(7)?,
        overall_rating: row.get::<_, i64>(8)?.clamp(0, 255) as u8,
        potential: row.get::<_, i64>(9)?.clamp(0, 255) as u8,
        market_value: row.get(10)?,
        wage: row.get(11)?,
        release_clause: row.get(12)?,
        attributes: attributes_json.as_deref().and_then(decode_attributes),
        contract_expiry: contract_expiry
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()),
        last_updated: row.get(15)?,
    })
}

// Blobs written by the historical implementation used all-identical values
// as an "unavailable" sentinel; those decode to None as well.
fn decode_attributes(raw: &str) -> Option<PlayerAttributes> {
    let attrs = serde_json::from_str::<PlayerAttributes>(raw).ok()?;
    if attrs.is_sentinel() { None } else { Some(attrs) }
}

pub fn load_all_players(conn: &Connection) -> Result<Vec<PlayerRecord>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql).context("prepare scan query")?;
    let rows = stmt.query_map([], player_from_row).context("scan players")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

pub fn get_player(conn: &Connection, id: i64) -> Result<Option<PlayerRecord>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");
    conn.query_row(&sql, params![id], player_from_row)
        .optional()
        .context("get player by id")
}

pub fn count_players(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
        .context("count players")?;
    Ok(count as usize)
}

pub fn distinct_leagues(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT league FROM players
             WHERE league IS NOT NULL AND league != ''
             ORDER BY league ASC",
        )
        .context("prepare distinct leagues query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query distinct leagues")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode league row")?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::decode_attributes;

    #[test]
    fn decode_rejects_sentinel_blobs() {
        let flat = r#"{"pace":0,"shooting":0,"passing":0,"dribbling":0,"defending":0,"physical":0}"#;
        assert_eq!(decode_attributes(flat), None);

        let real = r#"{"pace":91,"shooting":80,"passing":70,"dribbling":88,"defending":40,"physical":77}"#;
        let attrs = decode_attributes(real).expect("varied blob decodes");
        assert_eq!(attrs.pace, 91);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode_attributes("not json"), None);
        assert_eq!(decode_attributes("{}"), None);
    }
}
