// Players and their positions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PlayerId, TeamId};
use crate::records::ElementRecord;

/// Squad positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map the upstream `element_type` (1-4) to a position.
    pub fn from_element_type(element_type: u8) -> Option<Self> {
        match element_type {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Parse a position string. Accepts full names and the usual
    /// abbreviations (GK/GKP, DEF, MID, FWD), case-insensitively.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GKP" | "GOALKEEPER" => Some(Position::Goalkeeper),
            "DEF" | "DEFENDER" => Some(Position::Defender),
            "MID" | "MIDFIELDER" => Some(Position::Midfielder),
            "FWD" | "FW" | "FORWARD" => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Lowercase name used in constraint names.
    pub fn slug(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Forward => "forward",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A single player, as of one data refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub web_name: String,
    pub team: TeamId,
    pub position: Position,
    pub total_points: u32,
    /// Recent scoring rate.
    pub form: f64,
    /// Current cost in tenths of the budget unit.
    pub cost: u32,
    pub ownership_percent: f64,
    /// Chance of playing next round (0-100). `None` means fully available.
    pub chance_of_playing_next_round: Option<u8>,
    pub total_minutes: u32,
    pub transfers_in: u32,
    pub transfers_out: u32,
    /// Times picked for a game-week's highest-scoring XI.
    pub dream_team_count: u32,
    /// In the highest-scoring XI of the latest game-week.
    pub in_dream_team: bool,
}

impl Player {
    /// Build a player from its raw record. Returns `None` when the element
    /// type is not one of the four squad positions.
    pub fn from_record(record: &ElementRecord) -> Option<Self> {
        let position = Position::from_element_type(record.element_type)?;
        Some(Player {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.second_name.clone(),
            web_name: if record.web_name.is_empty() {
                record.second_name.clone()
            } else {
                record.web_name.clone()
            },
            team: record.team,
            position,
            // Negative season totals clamp to zero.
            total_points: record.total_points.max(0) as u32,
            form: record.form.max(0.0),
            cost: record.now_cost,
            ownership_percent: record.selected_by_percent.max(0.0),
            chance_of_playing_next_round: record.chance_of_playing_next_round.map(|c| c.min(100)),
            total_minutes: record.minutes,
            transfers_in: record.transfers_in,
            transfers_out: record.transfers_out,
            dream_team_count: record.dreamteam_count,
            in_dream_team: record.in_dreamteam,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Multiplier in [0, 1] derived from chance of playing.
    pub fn fitness(&self) -> f64 {
        match self.chance_of_playing_next_round {
            Some(chance) => f64::from(chance) / 100.0,
            None => 1.0,
        }
    }

    /// Cost in the main budget unit (e.g. 45 tenths -> 4.5).
    pub fn cost_in_units(&self) -> f64 {
        f64::from(self.cost) / 10.0
    }
}
