// Entity builders shared by unit tests.

use chrono::{TimeZone, Utc};
use gaffer_core::entity::{Fixture, GameWeek, Player, Position, Team};

pub fn game_week(id: u32, current: bool) -> GameWeek {
    GameWeek {
        id,
        name: format!("Gameweek {id}"),
        deadline: Utc.with_ymd_and_hms(2025, 8, 15, 17, 30, 0).unwrap(),
        is_previous: false,
        is_current: current,
        is_next: false,
        finished: false,
        average_score: 0,
        highest_score: None,
        chip_plays: vec![],
        transfers_made: 0,
        most_captained: None,
        most_vice_captained: None,
    }
}

pub fn team(id: u32) -> Team {
    Team {
        id,
        name: format!("Team {id}"),
        short_name: format!("T{id:02}"),
        overall_home_strength: 1000,
        overall_away_strength: 1000,
        attack_home_strength: 1000,
        attack_away_strength: 1000,
        defence_home_strength: 1000,
        defence_away_strength: 1000,
    }
}

pub fn fixture(
    id: u32,
    game_week: Option<u32>,
    home: u32,
    away: u32,
    home_difficulty: u8,
    away_difficulty: u8,
) -> Fixture {
    Fixture {
        id,
        game_week,
        kickoff: None,
        home_team: home,
        away_team: away,
        home_difficulty,
        away_difficulty,
        finished: false,
        stats: vec![],
    }
}

pub fn player(id: u32, team: u32, position: Position, cost: u32, total_points: u32) -> Player {
    Player {
        id,
        first_name: "Test".into(),
        last_name: format!("Player{id}"),
        web_name: format!("P{id}"),
        team,
        position,
        total_points,
        form: 1.0,
        cost,
        ownership_percent: 10.0,
        chance_of_playing_next_round: None,
        total_minutes: 900,
        transfers_in: 0,
        transfers_out: 0,
        dream_team_count: 0,
        in_dream_team: false,
    }
}
