// Read-only aggregations over a snapshot: value picks, stat leaders and
// league movers.

use std::cmp::Ordering;
use std::collections::HashMap;

use gaffer_core::entity::{
    Fixture, GameWeekId, LeagueId, LeagueStanding, Manager, Player, PlayerId, Position, StatType,
    TeamId,
};
use gaffer_core::{FplContext, FplError, LeagueSnapshot};
use serde::Serialize;
use tracing::info;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Optional restrictions on which players a query considers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    pub team: Option<TeamId>,
}

impl PlayerFilter {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.position.map_or(true, |p| player.position == p)
            && self.team.map_or(true, |t| player.team == t)
    }
}

// ---------------------------------------------------------------------------
// Best value
// ---------------------------------------------------------------------------

/// Points per tenth of cost.
pub fn value_ratio(player: &Player) -> Option<f64> {
    (player.cost > 0).then(|| f64::from(player.total_points) / f64::from(player.cost))
}

/// The `n` players with the best points-to-cost ratio, best first. Players
/// with zero cost are skipped.
pub fn best_value<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    n: usize,
    filter: PlayerFilter,
) -> Vec<Player> {
    if n == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(f64, &Player)> = players
        .into_iter()
        .filter(|p| filter.matches(p))
        .filter_map(|p| value_ratio(p).map(|r| (r, p)))
        .collect();
    ranked.sort_by(|(ra, a), (rb, b)| rb.total_cmp(ra).then_with(|| a.id.cmp(&b.id)));
    ranked.into_iter().take(n).map(|(_, p)| p.clone()).collect()
}

// ---------------------------------------------------------------------------
// Stat leaders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Top,
    Bottom,
}

/// Per-player totals of one stat across all fixtures.
pub fn stat_totals<'a>(
    fixtures: impl IntoIterator<Item = &'a Fixture>,
    stat_type: StatType,
) -> HashMap<PlayerId, i64> {
    let mut totals = HashMap::new();
    for stat in fixtures
        .into_iter()
        .flat_map(|f| f.stats.iter())
        .filter(|s| s.stat_type == stat_type)
    {
        *totals.entry(stat.player_id).or_insert(0) += i64::from(stat.value);
    }
    totals
}

/// Every player tied at the top (or bottom) total for `stat_type`, ordered
/// by id. Players with no recorded stat count as 0.
pub fn top_or_bottom_by_stat(
    snapshot: &LeagueSnapshot,
    stat_type: StatType,
    extreme: Extreme,
    filter: PlayerFilter,
) -> Vec<(Player, i64)> {
    let totals = stat_totals(snapshot.fixtures(), stat_type);
    let candidates: Vec<(&Player, i64)> = snapshot
        .players()
        .filter(|p| filter.matches(p))
        .map(|p| (p, totals.get(&p.id).copied().unwrap_or(0)))
        .collect();

    let target = match extreme {
        Extreme::Top => candidates.iter().map(|(_, v)| *v).max(),
        Extreme::Bottom => candidates.iter().map(|(_, v)| *v).min(),
    };
    let Some(target) = target else {
        return Vec::new();
    };

    candidates
        .into_iter()
        .filter(|(_, v)| *v == target)
        .map(|(p, v)| (p.clone(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Manager deltas
// ---------------------------------------------------------------------------

/// Game-week points change for one league entrant.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerDelta {
    pub standing: LeagueStanding,
    pub delta: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Improvement {
    Most,
    Least,
}

/// Points in `latest` minus points in `previous`. A missing game-week
/// counts as 0 points.
pub fn manager_delta(manager: &Manager, previous: GameWeekId, latest: GameWeekId) -> i32 {
    let points = |gw| manager.history_for(gw).map_or(0, |h| h.points);
    points(latest) - points(previous)
}

pub fn manager_deltas(
    managers: &[(LeagueStanding, Manager)],
    previous: GameWeekId,
    latest: GameWeekId,
) -> Vec<ManagerDelta> {
    managers
        .iter()
        .map(|(standing, manager)| ManagerDelta {
            standing: standing.clone(),
            delta: manager_delta(manager, previous, latest),
        })
        .collect()
}

/// The `count` most (or least) improved managers. The cutoff is the
/// `count`-th best delta and is inclusive, so ties can return more than
/// `count` rows.
pub fn improved(deltas: &[ManagerDelta], count: usize, direction: Improvement) -> Vec<ManagerDelta> {
    if count == 0 || deltas.is_empty() {
        return Vec::new();
    }
    let order = |a: &ManagerDelta, b: &ManagerDelta| -> Ordering {
        let by_delta = match direction {
            Improvement::Most => b.delta.cmp(&a.delta),
            Improvement::Least => a.delta.cmp(&b.delta),
        };
        by_delta.then_with(|| a.standing.rank.cmp(&b.standing.rank))
    };

    let mut sorted = deltas.to_vec();
    sorted.sort_by(order);
    let cutoff = sorted[count.min(sorted.len()) - 1].delta;
    sorted.retain(|d| match direction {
        Improvement::Most => d.delta >= cutoff,
        Improvement::Least => d.delta <= cutoff,
    });
    sorted
}

/// Walk every page of a league and rank managers by their change between
/// the last two finished game-weeks.
pub async fn improved_managers(
    ctx: &FplContext,
    league_id: LeagueId,
    count: usize,
    direction: Improvement,
) -> Result<Vec<ManagerDelta>, FplError> {
    let snapshot = ctx.snapshot().await?;
    let (previous, latest) = snapshot.last_two_finished_game_weeks()?;
    let (previous, latest) = (previous.id, latest.id);
    let managers = ctx.league_managers(league_id).await?;
    let deltas = manager_deltas(&managers, previous, latest);
    info!(
        league_id,
        managers = deltas.len(),
        previous,
        latest,
        ?direction,
        "Ranking league movers"
    );
    Ok(improved(&deltas, count, direction))
}
