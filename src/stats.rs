use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::continents::{Continent, classify, continent_label};
use crate::model::{DatabaseStats, Position};

// Per-position groups are combined with a count-weighted mean; with uneven
// group sizes an average-of-averages would skew toward small positions.
pub fn compute_stats(conn: &Connection) -> Result<DatabaseStats> {
    let groups = position_groups(conn)?;

    let total: usize = groups.iter().map(|g| g.count).sum();
    if total == 0 {
        return Ok(DatabaseStats::default());
    }

    let mut rating_sum = 0.0;
    let mut value_sum = 0.0;
    let mut age_sum = 0.0;
    for group in &groups {
        let weight = group.count as f64;
        rating_sum += group.avg_rating * weight;
        value_sum += group.avg_value * weight;
        age_sum += group.avg_age * weight;
    }

    let mut position_counts: Vec<(Position, usize)> =
        groups.iter().map(|g| (g.position, g.count)).collect();
    position_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.code().cmp(b.0.code())));

    let n = total as f64;
    Ok(DatabaseStats {
        total_players: total,
        average_rating: round1(rating_sum / n),
        average_value: (value_sum / n).round() as i64,
        average_age: round1(age_sum / n),
        position_counts,
    })
}

pub fn continent_counts(conn: &Connection) -> Result<Vec<(Continent, usize)>> {
    let mut stmt = conn
        .prepare("SELECT nationality, COUNT(*) FROM players GROUP BY nationality")
        .context("prepare nationality counts query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .context("query nationality counts")?;

    let mut buckets: HashMap<Continent, usize> = HashMap::new();
    for row in rows {
        let (nationality, count) = row.context("decode nationality row")?;
        // Countries outside the six lists stay out of every bucket.
        if let Some(continent) = classify(&nationality) {
            *buckets.entry(continent).or_default() += count as usize;
        }
    }

    let mut out: Vec<(Continent, usize)> = buckets.into_iter().collect();
    out.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(continent_label(a.0).cmp(continent_label(b.0)))
    });
    Ok(out)
}

struct PositionGroup {
    position: Position,
    count: usize,
    avg_rating: f64,
    avg_value: f64,
    avg_age: f64,
}

fn position_groups(conn: &Connection) -> Result<Vec<PositionGroup>> {
    let mut stmt = conn
        .prepare(
            "SELECT position, COUNT(*), AVG(overall_rating), AVG(market_value), AVG(age)
             FROM players GROUP BY position",
        )
        .context("prepare position stats query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
            ))
        })
        .context("query position stats")?;

    let mut out = Vec::new();
    for row in rows {
        let (code, count, avg_rating, avg_value, avg_age) =
            row.context("decode position stats row")?;
        let Some(position) = Position::from_code(&code) else {
            continue;
        };
        out.push(PositionGroup {
            position,
            count: count as usize,
            avg_rating,
            avg_value,
            avg_age,
        });
    }
    Ok(out)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
