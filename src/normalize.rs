use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use log::warn;
use once_cell::sync::Lazy;

use crate::model::{PlayerAttributes, PlayerRecord, Position};

pub const DEFAULT_AGE: u8 = 25;
pub const DEFAULT_RATING: i64 = 75;
pub const RATING_MIN: i64 = 40;
pub const RATING_MAX: i64 = 99;
pub const AGE_MIN: i64 = 16;
pub const AGE_MAX: i64 = 45;

static POSITION_CODES: Lazy<HashMap<&'static str, Position>> = Lazy::new(|| {
    crate::model::ALL_POSITIONS
        .iter()
        .map(|p| (p.code(), *p))
        .collect()
});

// One tokenized source row plus the header index built from the first line.
// Column lookups go through the header map, so extra columns are ignored
// and column order is free to vary between dataset exports.
pub struct RawRow<'a> {
    header: &'a HashMap<String, usize>,
    fields: &'a [String],
}

impl<'a> RawRow<'a> {
    pub fn new(header: &'a HashMap<String, usize>, fields: &'a [String]) -> Self {
        Self { header, fields }
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.header.get(column)?;
        let raw = self.fields.get(idx)?.trim();
        if is_missing(raw) { None } else { Some(raw) }
    }
}

// Empty cells and pandas-style not-a-number tokens both count as absent.
pub fn is_missing(raw: &str) -> bool {
    raw.is_empty()
        || raw == "-"
        || raw.eq_ignore_ascii_case("nan")
        || raw.eq_ignore_ascii_case("na")
        || raw.eq_ignore_ascii_case("null")
}

pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return None;
    }
    // Source cells sometimes hold "82.0"; go through float like the dataset does.
    trimmed.parse::<f64>().ok().map(|v| v.trunc() as i64)
}

pub fn parse_currency(raw: &str) -> i64 {
    let clean: String = raw
        .chars()
        .filter(|c| *c != '€' && *c != ',' && !c.is_whitespace())
        .collect();
    if is_missing(&clean) {
        return 0;
    }

    let (prefix, multiplier) = if let Some(p) = clean.strip_suffix(['M', 'm']) {
        (p, 1_000_000.0)
    } else if let Some(p) = clean.strip_suffix(['K', 'k']) {
        (p, 1_000.0)
    } else {
        (clean.as_str(), 1.0)
    };

    match prefix.parse::<f64>() {
        Ok(v) => ((v * multiplier).trunc() as i64).max(0),
        Err(_) => {
            warn!("unparsable currency value: {raw:?}");
            0
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return None;
    }
    // Contract columns sometimes carry a bare year like "2027".
    if trimmed.len() == 4
        && let Ok(year) = trimmed.parse::<i32>()
    {
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u8 {
    let mut age = i64::from(today.year() - dob.year());
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age.clamp(AGE_MIN, AGE_MAX) as u8
}

pub fn age_from_dob(raw: Option<&str>, today: NaiveDate) -> u8 {
    let Some(dob) = raw.and_then(parse_date) else {
        return DEFAULT_AGE;
    };
    age_on(dob, today)
}

pub fn parse_position(raw: Option<&str>) -> Position {
    let Some(list) = raw else {
        return Position::Cm;
    };
    let primary = list.split(',').next().unwrap_or("").trim();
    POSITION_CODES
        .get(primary.to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(Position::Cm)
}

pub fn parse_rating(raw: Option<&str>) -> u8 {
    let value = raw.and_then(parse_int).unwrap_or(DEFAULT_RATING);
    value.clamp(RATING_MIN, RATING_MAX) as u8
}

// The six sub-ratings exist only when the export carries the granular
// attribute columns. A row without any of them gets None, never six
// plausible-looking defaults.
pub fn parse_attributes(row: &RawRow) -> Option<PlayerAttributes> {
    let col = |name: &str| row.get(name).and_then(parse_int).filter(|v| *v > 0);

    let sources = [
        [col("acceleration"), col("sprint_speed")],
        [col("finishing"), col("shot_power")],
        [col("short_passing"), col("long_passing")],
        [col("dribbling"), None],
        [col("defensive_awareness"), col("standing_tackle")],
        [col("strength"), col("stamina")],
    ];
    if sources.iter().flatten().all(|v| v.is_none()) {
        return None;
    }

    let rating = |pair: [Option<i64>; 2]| {
        pair.into_iter()
            .flatten()
            .max()
            .unwrap_or(50)
            .clamp(1, RATING_MAX) as u8
    };
    let [pace, shooting, passing, dribbling, defending, physical] = sources.map(rating);

    let attributes = PlayerAttributes {
        pace,
        shooting,
        passing,
        dribbling,
        defending,
        physical,
    };
    if attributes.is_sentinel() {
        return None;
    }
    Some(attributes)
}

// Returns None when the identifier cannot be derived; the caller drops the
// row and keeps loading. Every other field degrades to its documented default.
pub fn normalize_row(row: &RawRow, today: NaiveDate) -> Option<PlayerRecord> {
    let Some(id) = row.get("player_id").and_then(parse_int) else {
        warn!(
            "dropping row without parsable player_id (name={:?})",
            row.get("name").unwrap_or("?")
        );
        return None;
    };

    let name = match row.get("name") {
        Some(name) => name.to_string(),
        None => format!("Player {id}"),
    };

    Some(PlayerRecord {
        id,
        name,
        age: age_from_dob(row.get("dob"), today),
        nationality: row.get("country_name").unwrap_or("Unknown").to_string(),
        club: row.get("club_name").map(str::to_string),
        league: row.get("club_league_name").map(str::to_string),
        position: parse_position(row.get("positions")),
        preferred_foot: row.get("preferred_foot").unwrap_or("Right").to_string(),
        overall_rating: parse_rating(row.get("overall_rating")),
        potential: parse_rating(row.get("potential")),
        market_value: parse_currency(row.get("value").unwrap_or("")),
        wage: parse_currency(row.get("wage").unwrap_or("")),
        release_clause: parse_currency(row.get("release_clause").unwrap_or("")),
        attributes: parse_attributes(row),
        contract_expiry: row.get("club_contract_valid_until").and_then(parse_date),
        last_updated: Utc::now().to_rfc3339(),
    })
}
