// Fixture difficulty over a look-ahead horizon.
//
// Each team's score is the summed difficulty of its fixtures in the next
// `horizon` game-weeks, adjusted for blank and double game-weeks. Lower is
// easier.

use std::collections::{BTreeSet, HashMap};

use gaffer_core::entity::{Fixture, GameWeek, GameWeekId, Team, TeamId};
use gaffer_core::LeagueSnapshot;
use tracing::debug;

/// Highest difficulty a single fixture can carry.
pub const MAX_PER_FIXTURE: u32 = 5;

/// One more than the worst possible difficulty over `horizon` game-weeks.
pub fn max_difficulty_plus_one(horizon: u32) -> u32 {
    horizon * MAX_PER_FIXTURE + 1
}

/// The first `horizon` game-week ids after the current one. With no current
/// game-week (pre-season) the window starts at the first game-week.
fn horizon_window<'a>(
    horizon: u32,
    game_weeks: impl IntoIterator<Item = &'a GameWeek>,
) -> BTreeSet<GameWeekId> {
    let game_weeks: Vec<&GameWeek> = game_weeks.into_iter().collect();
    let current = game_weeks
        .iter()
        .find(|g| g.is_current)
        .map(|g| g.id)
        .unwrap_or(0);
    let mut ids: Vec<GameWeekId> = game_weeks
        .iter()
        .map(|g| g.id)
        .filter(|id| *id > current)
        .collect();
    ids.sort_unstable();
    ids.into_iter().take(horizon as usize).collect()
}

/// Per-team difficulty over the next `horizon` game-weeks.
///
/// - zero fixtures in the window adds `horizon * 5 + 1`;
/// - fewer than `horizon` fixtures adds `(count % horizon) * 5`;
/// - more than `horizon` fixtures adds `(horizon - count) * 5`, lowering the
///   score;
/// - the result is clamped at 0.
///
/// Every team scores 0 when there is no fixture data at all or the horizon
/// is 0.
pub fn estimate<'a>(
    horizon: u32,
    game_weeks: impl IntoIterator<Item = &'a GameWeek>,
    teams: impl IntoIterator<Item = &'a Team>,
    fixtures: impl IntoIterator<Item = &'a Fixture>,
) -> HashMap<TeamId, u32> {
    let fixtures: Vec<&Fixture> = fixtures.into_iter().collect();
    let team_ids: Vec<TeamId> = teams.into_iter().map(|t| t.id).collect();

    if horizon == 0 || fixtures.is_empty() {
        return team_ids.into_iter().map(|id| (id, 0)).collect();
    }

    let window = horizon_window(horizon, game_weeks);
    let in_window: Vec<&Fixture> = fixtures
        .into_iter()
        .filter(|f| f.game_week.is_some_and(|gw| window.contains(&gw)))
        .collect();

    let h = i64::from(horizon);
    let per_fixture = i64::from(MAX_PER_FIXTURE);
    let mut result = HashMap::with_capacity(team_ids.len());
    for team in team_ids {
        let mut sum: i64 = 0;
        let mut count: i64 = 0;
        for fixture in &in_window {
            if let Some(d) = fixture.difficulty_for(team) {
                sum += i64::from(d);
                count += 1;
            }
        }

        let adjustment = if count == 0 {
            h * per_fixture + 1
        } else if count < h {
            (count % h) * per_fixture
        } else {
            (h - count) * per_fixture
        };
        let score = (sum + adjustment).max(0) as u32;
        if count != h {
            debug!(team, fixtures = count, horizon, score, "Blank or double game-week adjustment");
        }
        result.insert(team, score);
    }
    result
}

/// `estimate` over a snapshot's game-weeks, teams and fixtures.
pub fn estimate_for(snapshot: &LeagueSnapshot, horizon: u32) -> HashMap<TeamId, u32> {
    estimate(
        horizon,
        snapshot.game_weeks(),
        snapshot.teams(),
        snapshot.fixtures(),
    )
}
