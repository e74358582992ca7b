// Immutable entity model built from raw records.

pub mod fixture;
pub mod game_week;
pub mod manager;
pub mod player;
pub mod team;

pub use fixture::{Fixture, Stat, StatType};
pub use game_week::{ChipPlay, GameWeek};
pub use manager::{LeagueStanding, Manager, ManagerHistoryEntry, ManagerPick};
pub use player::{Player, Position};
pub use team::Team;

pub type PlayerId = u32;
pub type TeamId = u32;
pub type FixtureId = u32;
pub type GameWeekId = u32;
pub type ManagerId = u64;
pub type LeagueId = u64;
