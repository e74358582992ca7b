// Fixtures and per-player match statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::{FixtureId, GameWeekId, PlayerId, TeamId};
use crate::records::FixtureRecord;

/// Match statistic kinds tracked per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatType {
    Goal,
    Assist,
    OwnGoal,
    PenaltySave,
    PenaltyMiss,
    YellowCard,
    RedCard,
    Save,
    Bonus,
    Bps,
}

impl StatType {
    pub const ALL: [StatType; 10] = [
        StatType::Goal,
        StatType::Assist,
        StatType::OwnGoal,
        StatType::PenaltySave,
        StatType::PenaltyMiss,
        StatType::YellowCard,
        StatType::RedCard,
        StatType::Save,
        StatType::Bonus,
        StatType::Bps,
    ];

    /// Upstream identifier for this stat.
    pub fn code(&self) -> &'static str {
        match self {
            StatType::Goal => "goals_scored",
            StatType::Assist => "assists",
            StatType::OwnGoal => "own_goals",
            StatType::PenaltySave => "penalties_saved",
            StatType::PenaltyMiss => "penalties_missed",
            StatType::YellowCard => "yellow_cards",
            StatType::RedCard => "red_cards",
            StatType::Save => "saves",
            StatType::Bonus => "bonus",
            StatType::Bps => "bps",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        StatType::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Parse either the upstream code or a short user-facing name
    /// ("goal", "assist", "yellow", ...).
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if let Some(t) = StatType::from_code(&lower) {
            return Some(t);
        }
        match lower.replace(['-', ' '], "_").as_str() {
            "goal" | "goals" => Some(StatType::Goal),
            "assist" => Some(StatType::Assist),
            "own_goal" => Some(StatType::OwnGoal),
            "penalty_save" => Some(StatType::PenaltySave),
            "penalty_miss" => Some(StatType::PenaltyMiss),
            "yellow" | "yellow_card" => Some(StatType::YellowCard),
            "red" | "red_card" => Some(StatType::RedCard),
            "save" => Some(StatType::Save),
            _ => None,
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One player's value for one stat in one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub stat_type: StatType,
    pub player_id: PlayerId,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub id: FixtureId,
    /// `None` while the fixture has not been assigned to a game-week.
    pub game_week: Option<GameWeekId>,
    pub kickoff: Option<DateTime<Utc>>,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_difficulty: u8,
    pub away_difficulty: u8,
    pub finished: bool,
    pub stats: Vec<Stat>,
}

impl Fixture {
    pub fn is_team_involved(&self, team: TeamId) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Difficulty the given team faces in this fixture, if it plays in it.
    pub fn difficulty_for(&self, team: TeamId) -> Option<u8> {
        if self.home_team == team {
            Some(self.home_difficulty)
        } else if self.away_team == team {
            Some(self.away_difficulty)
        } else {
            None
        }
    }
}

impl From<&FixtureRecord> for Fixture {
    fn from(record: &FixtureRecord) -> Self {
        let mut stats = Vec::new();
        for group in &record.stats {
            let Some(stat_type) = StatType::from_code(&group.identifier) else {
                debug!(fixture = record.id, code = %group.identifier, "Skipping unknown stat code");
                continue;
            };
            stats.extend(group.h.iter().chain(group.a.iter()).map(|v| Stat {
                stat_type,
                player_id: v.element,
                value: v.value,
            }));
        }

        Fixture {
            id: record.id,
            game_week: record.event,
            kickoff: record.kickoff_time,
            home_team: record.team_h,
            away_team: record.team_a,
            home_difficulty: record.team_h_difficulty,
            away_difficulty: record.team_a_difficulty,
            finished: record.finished,
            stats,
        }
    }
}
