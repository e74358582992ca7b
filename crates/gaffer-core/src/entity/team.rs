// Premier League teams.

use serde::Serialize;

use super::TeamId;
use crate::records::TeamRecord;

/// A team. Strength ratings are informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
    pub overall_home_strength: u32,
    pub overall_away_strength: u32,
    pub attack_home_strength: u32,
    pub attack_away_strength: u32,
    pub defence_home_strength: u32,
    pub defence_away_strength: u32,
}

impl From<&TeamRecord> for Team {
    fn from(record: &TeamRecord) -> Self {
        Team {
            id: record.id,
            name: record.name.clone(),
            short_name: record.short_name.clone(),
            overall_home_strength: record.strength_overall_home,
            overall_away_strength: record.strength_overall_away,
            attack_home_strength: record.strength_attack_home,
            attack_away_strength: record.strength_attack_away,
            defence_home_strength: record.strength_defence_home,
            defence_away_strength: record.strength_defence_away,
        }
    }
}
