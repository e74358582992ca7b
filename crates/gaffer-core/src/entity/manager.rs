// Fantasy managers, their history and league standings.

use serde::Serialize;

use super::{GameWeekId, ManagerId, PlayerId};
use crate::records::{ManagerHistoryEntryRecord, ManagerRecord, PickRecord, StandingRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manager {
    pub id: ManagerId,
    pub first_name: String,
    pub last_name: String,
    pub team_name: String,
    pub history: Vec<ManagerHistoryEntry>,
}

impl Manager {
    pub fn from_records(record: &ManagerRecord, history: &[ManagerHistoryEntryRecord]) -> Self {
        let mut history: Vec<ManagerHistoryEntry> =
            history.iter().map(ManagerHistoryEntry::from).collect();
        history.sort_by_key(|h| h.game_week);
        Manager {
            id: record.id,
            first_name: record.player_first_name.clone(),
            last_name: record.player_last_name.clone(),
            team_name: record.name.clone(),
            history,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn history_for(&self, game_week: GameWeekId) -> Option<&ManagerHistoryEntry> {
        self.history.iter().find(|h| h.game_week == game_week)
    }
}

/// One game-week row of a manager's season history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerHistoryEntry {
    pub game_week: GameWeekId,
    pub points: i32,
    pub total_points: i32,
    pub rank: Option<u64>,
    pub bank: i32,
    pub team_value: i32,
    pub transfers: u32,
    pub transfers_cost: i32,
    pub points_on_bench: i32,
}

impl From<&ManagerHistoryEntryRecord> for ManagerHistoryEntry {
    fn from(record: &ManagerHistoryEntryRecord) -> Self {
        ManagerHistoryEntry {
            game_week: record.event,
            points: record.points,
            total_points: record.total_points,
            rank: record.rank,
            bank: record.bank,
            team_value: record.value,
            transfers: record.event_transfers,
            transfers_cost: record.event_transfers_cost,
            points_on_bench: record.points_on_bench,
        }
    }
}

/// A player slot in a manager's game-week selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagerPick {
    pub player_id: PlayerId,
    /// Slot 1-15; 1-11 start, 12-15 are the bench.
    pub slot: u8,
    pub multiplier: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

impl From<&PickRecord> for ManagerPick {
    fn from(record: &PickRecord) -> Self {
        ManagerPick {
            player_id: record.element,
            slot: record.position,
            multiplier: record.multiplier,
            is_captain: record.is_captain,
            is_vice_captain: record.is_vice_captain,
        }
    }
}

/// One row of a classic league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueStanding {
    pub manager_id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    pub rank: u32,
    pub last_rank: u32,
    pub total_points: i32,
    pub event_points: i32,
}

impl From<&StandingRecord> for LeagueStanding {
    fn from(record: &StandingRecord) -> Self {
        LeagueStanding {
            manager_id: record.entry,
            manager_name: record.player_name.clone(),
            team_name: record.entry_name.clone(),
            rank: record.rank,
            last_rank: record.last_rank,
            total_points: record.total,
            event_points: record.event_total,
        }
    }
}
