// Game-weeks (rounds of fixtures).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{GameWeekId, PlayerId};
use crate::records::{ChipPlayRecord, EventRecord};

/// How many managers played a chip in one game-week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChipPlay {
    /// Upstream chip name, e.g. `wildcard`, `bboost`, `3xc`, `freehit`.
    pub chip: String,
    pub played: u32,
}

impl From<&ChipPlayRecord> for ChipPlay {
    fn from(record: &ChipPlayRecord) -> Self {
        ChipPlay {
            chip: record.chip_name.clone(),
            played: record.num_played,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameWeek {
    pub id: GameWeekId,
    pub name: String,
    pub deadline: DateTime<Utc>,
    pub is_previous: bool,
    pub is_current: bool,
    pub is_next: bool,
    pub finished: bool,
    pub average_score: i32,
    pub highest_score: Option<i32>,
    pub chip_plays: Vec<ChipPlay>,
    /// Transfers made by all managers ahead of this game-week.
    pub transfers_made: u32,
    pub most_captained: Option<PlayerId>,
    pub most_vice_captained: Option<PlayerId>,
}

impl GameWeek {
    /// Times `chip` was played this game-week; 0 when it was not played.
    pub fn chip_count(&self, chip: &str) -> u32 {
        self.chip_plays
            .iter()
            .filter(|c| c.chip.eq_ignore_ascii_case(chip))
            .map(|c| c.played)
            .sum()
    }
}

impl From<&EventRecord> for GameWeek {
    fn from(record: &EventRecord) -> Self {
        GameWeek {
            id: record.id,
            name: record.name.clone(),
            deadline: record.deadline_time,
            is_previous: record.is_previous,
            is_current: record.is_current,
            is_next: record.is_next,
            finished: record.finished,
            average_score: record.average_entry_score,
            highest_score: record.highest_score,
            chip_plays: record.chip_plays.iter().map(ChipPlay::from).collect(),
            transfers_made: record.transfers_made,
            most_captained: record.most_captained,
            most_vice_captained: record.most_vice_captained,
        }
    }
}
