// Raw upstream records, decoded straight from the league API's JSON.
//
// Only the fields the entity model consumes are declared; serde ignores the
// rest. Mapping into entities lives in `entity` and `snapshot`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// bootstrap-static
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapRecord {
    pub events: Vec<EventRecord>,
    pub teams: Vec<TeamRecord>,
    pub elements: Vec<ElementRecord>,
}

/// A game-week ("event" upstream).
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub id: u32,
    pub name: String,
    pub deadline_time: DateTime<Utc>,
    #[serde(default)]
    pub average_entry_score: i32,
    #[serde(default)]
    pub highest_score: Option<i32>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub is_previous: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub chip_plays: Vec<ChipPlayRecord>,
    #[serde(default)]
    pub transfers_made: u32,
    #[serde(default)]
    pub most_captained: Option<u32>,
    #[serde(default)]
    pub most_vice_captained: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChipPlayRecord {
    pub chip_name: String,
    pub num_played: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub strength_overall_home: u32,
    #[serde(default)]
    pub strength_overall_away: u32,
    #[serde(default)]
    pub strength_attack_home: u32,
    #[serde(default)]
    pub strength_attack_away: u32,
    #[serde(default)]
    pub strength_defence_home: u32,
    #[serde(default)]
    pub strength_defence_away: u32,
}

/// A player ("element" upstream). `form` and `selected_by_percent` arrive as
/// decimal strings; both strings and bare numbers are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementRecord {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    #[serde(default)]
    pub web_name: String,
    pub team: u32,
    pub element_type: u8,
    pub now_cost: u32,
    pub total_points: i32,
    #[serde(deserialize_with = "lenient_f64")]
    pub form: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub selected_by_percent: f64,
    #[serde(default)]
    pub chance_of_playing_next_round: Option<u8>,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub transfers_in: u32,
    #[serde(default)]
    pub transfers_out: u32,
    #[serde(default)]
    pub dreamteam_count: u32,
    #[serde(default)]
    pub in_dreamteam: bool,
}

// ---------------------------------------------------------------------------
// fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRecord {
    pub id: u32,
    /// Game-week id; null while the fixture is unscheduled.
    #[serde(default)]
    pub event: Option<u32>,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u8,
    pub team_a_difficulty: u8,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub stats: Vec<FixtureStatsRecord>,
}

/// All values of one stat type in a fixture, split by side.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureStatsRecord {
    pub identifier: String,
    #[serde(default)]
    pub a: Vec<StatValueRecord>,
    #[serde(default)]
    pub h: Vec<StatValueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatValueRecord {
    pub value: i32,
    pub element: u32,
}

// ---------------------------------------------------------------------------
// managers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PicksRecord {
    pub picks: Vec<PickRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickRecord {
    pub element: u32,
    pub position: u8,
    #[serde(default)]
    pub multiplier: u8,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerRecord {
    pub id: u64,
    pub player_first_name: String,
    pub player_last_name: String,
    /// Team name.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerHistoryRecord {
    pub current: Vec<ManagerHistoryEntryRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerHistoryEntryRecord {
    pub event: u32,
    pub points: i32,
    pub total_points: i32,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub bank: i32,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub event_transfers: u32,
    #[serde(default)]
    pub event_transfers_cost: i32,
    #[serde(default)]
    pub points_on_bench: i32,
}

// ---------------------------------------------------------------------------
// classic league standings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueStandingsRecord {
    pub league: LeagueInfoRecord,
    pub standings: StandingsPageRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueInfoRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsPageRecord {
    pub has_next: bool,
    pub page: u32,
    pub results: Vec<StandingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingRecord {
    pub entry: u64,
    pub entry_name: String,
    pub player_name: String,
    pub rank: u32,
    #[serde(default)]
    pub last_rank: u32,
    pub total: i32,
    pub event_total: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accept `"5.2"`, `5.2` or `null`. Unparseable or non-finite values decode
/// as 0.0 rather than failing the whole payload.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    let value = match raw {
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}
