use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Gk,
    Cb,
    Lb,
    Rb,
    Lwb,
    Rwb,
    Cdm,
    Cm,
    Cam,
    Lm,
    Rm,
    Lw,
    Rw,
    Cf,
    St,
}

pub const ALL_POSITIONS: [Position; 15] = [
    Position::Gk,
    Position::Cb,
    Position::Lb,
    Position::Rb,
    Position::Lwb,
    Position::Rwb,
    Position::Cdm,
    Position::Cm,
    Position::Cam,
    Position::Lm,
    Position::Rm,
    Position::Lw,
    Position::Rw,
    Position::Cf,
    Position::St,
];

impl Position {
    pub fn code(self) -> &'static str {
        match self {
            Position::Gk => "GK",
            Position::Cb => "CB",
            Position::Lb => "LB",
            Position::Rb => "RB",
            Position::Lwb => "LWB",
            Position::Rwb => "RWB",
            Position::Cdm => "CDM",
            Position::Cm => "CM",
            Position::Cam => "CAM",
            Position::Lm => "LM",
            Position::Rm => "RM",
            Position::Lw => "LW",
            Position::Rw => "RW",
            Position::Cf => "CF",
            Position::St => "ST",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL_POSITIONS
            .iter()
            .copied()
            .find(|p| p.code().eq_ignore_ascii_case(code))
    }
}

// Serialized as a single JSON blob in the store; field order is the
// storage contract: pace, shooting, passing, dribbling, defending, physical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub pace: u8,
    pub shooting: u8,
    pub passing: u8,
    pub dribbling: u8,
    pub defending: u8,
    pub physical: u8,
}

impl PlayerAttributes {
    // All-zero or all-identical blobs come from sources without genuine
    // per-attribute detail; callers treat those as absent.
    pub fn is_sentinel(&self) -> bool {
        let vals = [
            self.pace,
            self.shooting,
            self.passing,
            self.dribbling,
            self.defending,
            self.physical,
        ];
        vals.iter().all(|v| *v == vals[0])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: i64,
    pub name: String,
    pub age: u8,
    pub nationality: String,
    pub club: Option<String>,
    pub league: Option<String>,
    pub position: Position,
    pub preferred_foot: String,
    pub overall_rating: u8,
    pub potential: u8,
    pub market_value: i64,
    pub wage: i64,
    pub release_clause: i64,
    pub attributes: Option<PlayerAttributes>,
    pub contract_expiry: Option<NaiveDate>,
    pub last_updated: String,
}

impl PlayerRecord {
    pub fn growth_potential(&self) -> i32 {
        i32::from(self.potential) - i32::from(self.overall_rating)
    }

    pub fn is_young_talent(&self) -> bool {
        self.age < 23 && self.potential >= 80
    }

    pub fn value_per_rating(&self) -> f64 {
        if self.overall_rating == 0 {
            return 0.0;
        }
        self.market_value as f64 / f64::from(self.overall_rating)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub position: Option<Position>,
    pub min_overall: Option<u8>,
    pub max_age: Option<u8>,
    pub max_price: Option<i64>,
    pub min_potential: Option<u8>,
    pub nationality: Option<String>,
    pub league: Option<String>,
    pub club: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseStats {
    pub total_players: usize,
    pub average_rating: f64,
    pub average_value: i64,
    pub average_age: f64,
    pub position_counts: Vec<(Position, usize)>,
}
