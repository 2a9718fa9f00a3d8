use anyhow::{Context, Result};
use rusqlite::{Connection, ToSql, params_from_iter};

use crate::continents::{Continent, classify};
use crate::model::{PlayerRecord, SearchCriteria};
use crate::normalize::{AGE_MAX, AGE_MIN, RATING_MAX, RATING_MIN};
use crate::store::{PLAYER_COLUMNS, player_from_row};

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const DEFAULT_LEAGUE_MIN_RATING: u8 = 80;
pub const DEFAULT_CONTINENT_MIN_RATING: u8 = 75;

pub fn search(
    conn: &Connection,
    criteria: &SearchCriteria,
    limit: usize,
) -> Result<Vec<PlayerRecord>> {
    query_players(conn, criteria, Some(limit))
}

pub fn by_league(
    conn: &Connection,
    league: &str,
    min_rating: u8,
    limit: usize,
) -> Result<Vec<PlayerRecord>> {
    let criteria = SearchCriteria {
        league: Some(league.to_string()),
        min_overall: Some(min_rating),
        ..SearchCriteria::default()
    };
    search(conn, &criteria, limit)
}

// The classifier lives on this side of the SQL boundary, so continent
// filtering selects by rating first and buckets in memory. The cap is
// applied after the filter to keep the top-N guarantee.
pub fn by_continent(
    conn: &Connection,
    continent: Continent,
    min_rating: u8,
    limit: usize,
) -> Result<Vec<PlayerRecord>> {
    let criteria = SearchCriteria {
        min_overall: Some(min_rating),
        ..SearchCriteria::default()
    };
    let mut players: Vec<PlayerRecord> = query_players(conn, &criteria, None)?
        .into_iter()
        .filter(|p| classify(&p.nationality) == Some(continent))
        .collect();
    players.truncate(limit);
    Ok(players)
}

pub fn find_young_talents(
    conn: &Connection,
    max_age: u8,
    min_potential: u8,
    limit: usize,
) -> Result<Vec<PlayerRecord>> {
    let criteria = SearchCriteria {
        max_age: Some(max_age),
        min_potential: Some(min_potential),
        ..SearchCriteria::default()
    };
    let mut players = query_players(conn, &criteria, None)?;
    players.sort_by(|a, b| {
        (b.potential, b.growth_potential()).cmp(&(a.potential, a.growth_potential()))
    });
    players.truncate(limit);
    Ok(players)
}

pub fn find_best_value_players(
    conn: &Connection,
    max_budget: Option<i64>,
    limit: usize,
) -> Result<Vec<(PlayerRecord, f64)>> {
    let criteria = SearchCriteria {
        max_price: max_budget,
        ..SearchCriteria::default()
    };
    let mut scored: Vec<(PlayerRecord, f64)> = query_players(conn, &criteria, None)?
        .into_iter()
        .map(|p| {
            let score = if p.market_value > 0 {
                f64::from(p.overall_rating) * 1_000_000.0 / p.market_value as f64
            } else {
                0.0
            };
            (p, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(limit);
    Ok(scored)
}

// Present criteria AND together; values outside their valid domain impose
// no constraint at all rather than erroring or matching nothing.
fn query_players(
    conn: &Connection,
    criteria: &SearchCriteria,
    limit: Option<usize>,
) -> Result<Vec<PlayerRecord>> {
    let mut sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE 1=1");
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(position) = criteria.position {
        sql.push_str(" AND position = ?");
        args.push(Box::new(position.code()));
    }
    if let Some(min_overall) = criteria.min_overall
        && rating_in_range(min_overall)
    {
        sql.push_str(" AND overall_rating >= ?");
        args.push(Box::new(i64::from(min_overall)));
    }
    if let Some(max_age) = criteria.max_age
        && age_in_range(max_age)
    {
        sql.push_str(" AND age <= ?");
        args.push(Box::new(i64::from(max_age)));
    }
    if let Some(max_price) = criteria.max_price
        && max_price >= 0
    {
        sql.push_str(" AND market_value <= ?");
        args.push(Box::new(max_price));
    }
    if let Some(min_potential) = criteria.min_potential
        && rating_in_range(min_potential)
    {
        sql.push_str(" AND potential >= ?");
        args.push(Box::new(i64::from(min_potential)));
    }
    // instr() is byte-wise containment; LIKE would fold ASCII case.
    for (column, value) in [
        ("nationality", &criteria.nationality),
        ("league", &criteria.league),
        ("club", &criteria.club),
    ] {
        if let Some(needle) = value
            && !needle.is_empty()
        {
            sql.push_str(&format!(" AND instr({column}, ?) > 0"));
            args.push(Box::new(needle.clone()));
        }
    }

    sql.push_str(" ORDER BY overall_rating DESC, market_value DESC");
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        args.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql).context("prepare search query")?;
    let rows = stmt
        .query_map(params_from_iter(args.iter().map(|a| a.as_ref())), player_from_row)
        .context("query players")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

fn rating_in_range(value: u8) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&i64::from(value))
}

fn age_in_range(value: u8) -> bool {
    (AGE_MIN..=AGE_MAX).contains(&i64::from(value))
}
