// Read-only id -> entity indexes built once per fetch cycle.
//
// Every cross-entity reference (player -> team, fixture -> game-week) is
// resolved through a `LeagueSnapshot` so a squad computed from one snapshot
// stays internally consistent even after a newer fetch.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::entity::{
    Fixture, FixtureId, GameWeek, GameWeekId, Player, PlayerId, Position, Team, TeamId,
};
use crate::error::FplError;
use crate::records::{BootstrapRecord, FixtureRecord};

#[derive(Debug, Clone, Default)]
pub struct LeagueSnapshot {
    players: BTreeMap<PlayerId, Player>,
    teams: BTreeMap<TeamId, Team>,
    game_weeks: BTreeMap<GameWeekId, GameWeek>,
    fixtures: BTreeMap<FixtureId, Fixture>,
}

impl LeagueSnapshot {
    /// Build a snapshot from the bootstrap payload and the fixture list.
    /// Players with an unknown element type are dropped with a warning.
    pub fn from_records(bootstrap: &BootstrapRecord, fixtures: &[FixtureRecord]) -> Self {
        let mut players = BTreeMap::new();
        for element in &bootstrap.elements {
            match Player::from_record(element) {
                Some(player) => {
                    players.insert(player.id, player);
                }
                None => warn!(
                    player_id = element.id,
                    element_type = element.element_type,
                    "Skipping player with unknown element type"
                ),
            }
        }

        let snapshot = LeagueSnapshot {
            players,
            teams: bootstrap.teams.iter().map(|t| (t.id, Team::from(t))).collect(),
            game_weeks: bootstrap
                .events
                .iter()
                .map(|e| (e.id, GameWeek::from(e)))
                .collect(),
            fixtures: fixtures.iter().map(|f| (f.id, Fixture::from(f))).collect(),
        };
        debug!(
            players = snapshot.players.len(),
            teams = snapshot.teams.len(),
            game_weeks = snapshot.game_weeks.len(),
            fixtures = snapshot.fixtures.len(),
            "Built league snapshot"
        );
        snapshot
    }

    /// Build a snapshot directly from entities.
    pub fn from_entities(
        players: impl IntoIterator<Item = Player>,
        teams: impl IntoIterator<Item = Team>,
        game_weeks: impl IntoIterator<Item = GameWeek>,
        fixtures: impl IntoIterator<Item = Fixture>,
    ) -> Self {
        LeagueSnapshot {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            teams: teams.into_iter().map(|t| (t.id, t)).collect(),
            game_weeks: game_weeks.into_iter().map(|g| (g.id, g)).collect(),
            fixtures: fixtures.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    /// All players, ordered by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// All game-weeks, ordered by id.
    pub fn game_weeks(&self) -> impl Iterator<Item = &GameWeek> {
        self.game_weeks.values()
    }

    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.values()
    }

    // -----------------------------------------------------------------------
    // Lookups by id
    // -----------------------------------------------------------------------

    pub fn player(&self, id: PlayerId) -> Result<&Player, FplError> {
        self.players
            .get(&id)
            .ok_or_else(|| FplError::not_found("player", id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, FplError> {
        self.teams
            .get(&id)
            .ok_or_else(|| FplError::not_found("team", id))
    }

    pub fn game_week(&self, id: GameWeekId) -> Result<&GameWeek, FplError> {
        self.game_weeks
            .get(&id)
            .ok_or_else(|| FplError::not_found("game-week", id))
    }

    pub fn fixture(&self, id: FixtureId) -> Result<&Fixture, FplError> {
        self.fixtures
            .get(&id)
            .ok_or_else(|| FplError::not_found("fixture", id))
    }

    /// The team a player belongs to.
    pub fn team_of(&self, player: &Player) -> Result<&Team, FplError> {
        self.team(player.team)
    }

    /// Resolve a list of player ids, failing on the first unknown id.
    pub fn players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<Player>, FplError> {
        ids.iter().map(|id| self.player(*id).cloned()).collect()
    }

    // -----------------------------------------------------------------------
    // Filters
    // -----------------------------------------------------------------------

    pub fn players_by_position(&self, position: Position) -> Vec<&Player> {
        self.players
            .values()
            .filter(|p| p.position == position)
            .collect()
    }

    pub fn players_by_team(&self, team: TeamId) -> Result<Vec<&Player>, FplError> {
        self.team(team)?;
        Ok(self.players.values().filter(|p| p.team == team).collect())
    }

    /// Fixtures the team plays in, ordered by fixture id.
    pub fn fixtures_for_team(&self, team: TeamId) -> Vec<&Fixture> {
        self.fixtures
            .values()
            .filter(|f| f.is_team_involved(team))
            .collect()
    }

    pub fn fixtures_for_game_week(&self, game_week: GameWeekId) -> Vec<&Fixture> {
        self.fixtures
            .values()
            .filter(|f| f.game_week == Some(game_week))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Game-week navigation
    // -----------------------------------------------------------------------

    pub fn current_game_week(&self) -> Result<&GameWeek, FplError> {
        self.game_weeks
            .values()
            .find(|g| g.is_current)
            .ok_or(FplError::NoGameWeek("current"))
    }

    pub fn next_game_week(&self) -> Result<&GameWeek, FplError> {
        self.game_weeks
            .values()
            .find(|g| g.is_next)
            .ok_or(FplError::NoGameWeek("next"))
    }

    /// The first `n` game-weeks after the current one. Before the season
    /// starts (no current game-week) this is the first `n` overall.
    pub fn next_game_weeks(&self, n: usize) -> Vec<&GameWeek> {
        let current = self.current_game_week().map(|g| g.id).unwrap_or(0);
        self.game_weeks
            .range(current + 1..)
            .map(|(_, g)| g)
            .take(n)
            .collect()
    }

    pub fn latest_finished_game_week(&self) -> Result<&GameWeek, FplError> {
        self.game_weeks
            .values()
            .rev()
            .find(|g| g.finished)
            .ok_or(FplError::NoGameWeek("finished"))
    }

    /// The two most recent finished game-weeks as (previous, latest).
    pub fn last_two_finished_game_weeks(&self) -> Result<(&GameWeek, &GameWeek), FplError> {
        let mut finished = self.game_weeks.values().rev().filter(|g| g.finished);
        let latest = finished.next().ok_or(FplError::NoGameWeek("finished"))?;
        let previous = finished
            .next()
            .ok_or(FplError::NoGameWeek("previous finished"))?;
        Ok((previous, latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn gw(id: u32, current: bool, finished: bool) -> GameWeek {
        GameWeek {
            id,
            name: format!("Gameweek {id}"),
            deadline: Utc.with_ymd_and_hms(2025, 8, 1, 10, 0, 0).unwrap(),
            is_previous: false,
            is_current: current,
            is_next: false,
            finished,
            average_score: 50,
            highest_score: None,
            chip_plays: vec![],
            transfers_made: 0,
            most_captained: None,
            most_vice_captained: None,
        }
    }

    fn team(id: u32) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            short_name: format!("T{id}"),
            overall_home_strength: 0,
            overall_away_strength: 0,
            attack_home_strength: 0,
            attack_away_strength: 0,
            defence_home_strength: 0,
            defence_away_strength: 0,
        }
    }

    fn player(id: u32, team: u32, position: Position) -> Player {
        Player {
            id,
            first_name: "F".into(),
            last_name: format!("P{id}"),
            web_name: format!("P{id}"),
            team,
            position,
            total_points: 10,
            form: 1.0,
            cost: 50,
            ownership_percent: 5.0,
            chance_of_playing_next_round: None,
            total_minutes: 90,
            transfers_in: 0,
            transfers_out: 0,
            dream_team_count: 0,
            in_dream_team: false,
        }
    }

    fn fixture(id: u32, game_week: Option<u32>, home: u32, away: u32) -> Fixture {
        Fixture {
            id,
            game_week,
            kickoff: None,
            home_team: home,
            away_team: away,
            home_difficulty: 3,
            away_difficulty: 3,
            finished: false,
            stats: vec![],
        }
    }

    fn snapshot() -> LeagueSnapshot {
        LeagueSnapshot::from_entities(
            vec![
                player(1, 1, Position::Goalkeeper),
                player(2, 1, Position::Forward),
                player(3, 2, Position::Forward),
            ],
            vec![team(1), team(2)],
            vec![gw(1, false, true), gw(2, false, true), gw(3, true, false), gw(4, false, false), gw(5, false, false)],
            vec![fixture(1, Some(4), 1, 2), fixture(2, None, 2, 1), fixture(3, Some(5), 2, 3)],
        )
    }

    #[test]
    fn unknown_ids_are_typed_not_found() {
        let snap = snapshot();
        assert!(matches!(
            snap.player(99),
            Err(FplError::DataNotFound { kind: "player", id: 99 })
        ));
        assert!(snap.players_by_team(42).is_err());
        assert!(snap.players_by_ids(&[1, 99]).is_err());
    }

    #[test]
    fn filters_by_position_and_team() {
        let snap = snapshot();
        assert_eq!(snap.players_by_position(Position::Forward).len(), 2);
        let ids: Vec<u32> = snap.players_by_team(1).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn fixtures_by_team_and_game_week() {
        let snap = snapshot();
        assert_eq!(snap.fixtures_for_team(1).len(), 2);
        assert_eq!(snap.fixtures_for_game_week(4).len(), 1);
        assert!(snap.fixtures_for_game_week(3).is_empty());
    }

    #[test]
    fn game_week_navigation() {
        let snap = snapshot();
        assert_eq!(snap.current_game_week().unwrap().id, 3);
        let next: Vec<u32> = snap.next_game_weeks(5).iter().map(|g| g.id).collect();
        assert_eq!(next, vec![4, 5]);
        assert_eq!(snap.latest_finished_game_week().unwrap().id, 2);
        let (prev, latest) = snap.last_two_finished_game_weeks().unwrap();
        assert_eq!((prev.id, latest.id), (1, 2));
        assert!(matches!(snap.next_game_week(), Err(FplError::NoGameWeek("next"))));
    }
}
