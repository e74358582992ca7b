// Squad recommendation entry points.
//
// Every call builds a fresh model and backend, so a `Recommender` can be
// shared freely. Inputs come from one `LeagueSnapshot`.

use std::collections::HashSet;
use std::marker::PhantomData;

use gaffer_core::config::SquadConfig;
use gaffer_core::entity::{ManagerId, Player, PlayerId, Position, TeamId};
use gaffer_core::{FplContext, LeagueSnapshot};
use serde::Serialize;
use tracing::info;

use crate::backend::{GoodLpBackend, OptimizationBackend};
use crate::difficulty;
use crate::error::RecommendError;
use crate::model_builder::{SquadModelBuilder, SquadRules, SQUAD_SIZE, STARTING_XI_SIZE};
use crate::selector::{select, SelectionOrder};

/// Fixture look-ahead for a single game-week decision.
const NEXT_GAME_WEEK: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendSettings {
    pub rules: SquadRules,
    pub squad_horizon: u32,
    pub free_hit_horizon: u32,
    pub differential_max_ownership: f64,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            rules: SquadRules::default(),
            squad_horizon: 3,
            free_hit_horizon: 1,
            differential_max_ownership: 10.0,
        }
    }
}

impl From<&SquadConfig> for RecommendSettings {
    fn from(config: &SquadConfig) -> Self {
        Self {
            rules: SquadRules::from(config),
            squad_horizon: config.squad_horizon,
            free_hit_horizon: config.free_hit_horizon,
            differential_max_ownership: config.differential_max_ownership,
        }
    }
}

/// A recommended squad plus the (out, in) swaps that reach it.
#[derive(Debug, Clone, Serialize)]
pub struct TransferPlan {
    pub squad: Vec<Player>,
    pub transfers: Vec<(Player, Player)>,
}

pub struct Recommender<B = GoodLpBackend> {
    settings: RecommendSettings,
    backend: PhantomData<fn() -> B>,
}

impl Recommender<GoodLpBackend> {
    pub fn new(settings: RecommendSettings) -> Self {
        Self::with_backend(settings)
    }
}

impl<B: OptimizationBackend + Default> Recommender<B> {
    pub fn with_backend(settings: RecommendSettings) -> Self {
        Self {
            settings,
            backend: PhantomData,
        }
    }

    pub fn settings(&self) -> &RecommendSettings {
        &self.settings
    }

    fn builder(&self, snapshot: &LeagueSnapshot, horizon: u32) -> SquadModelBuilder {
        SquadModelBuilder::new(
            self.settings.rules,
            horizon,
            difficulty::estimate_for(snapshot, horizon),
        )
    }

    fn solve_and_select(
        &self,
        builder: &SquadModelBuilder,
        k: u32,
    ) -> Result<Vec<Player>, RecommendError> {
        let resolved = builder.solve(&mut B::default())?;
        Ok(select(&resolved, k as usize, SelectionOrder::Weight)?)
    }

    fn full_squad_model(&self, builder: &mut SquadModelBuilder) {
        builder
            .add_budget_constraint()
            .add_max_per_team_constraint()
            .add_exact_position_quota_constraint()
            .add_low_cost_bench_constraint();
    }

    /// Best legal 15-player squad over the configured horizon.
    pub fn recommend_full_squad(
        &self,
        snapshot: &LeagueSnapshot,
    ) -> Result<Vec<Player>, RecommendError> {
        let mut builder = self.builder(snapshot, self.settings.squad_horizon);
        builder.initialize_variables(snapshot.players());
        self.full_squad_model(&mut builder);
        let squad = self.solve_and_select(&builder, SQUAD_SIZE)?;
        info!(players = squad.len(), "Recommended full squad");
        Ok(squad)
    }

    /// Best legal 15-player squad for the next game-week only. Players whose
    /// team has no fixture in that game-week are excluded.
    pub fn recommend_free_hit_squad(
        &self,
        snapshot: &LeagueSnapshot,
    ) -> Result<Vec<Player>, RecommendError> {
        let playing: HashSet<TeamId> = snapshot
            .next_game_weeks(1)
            .iter()
            .flat_map(|gw| snapshot.fixtures_for_game_week(gw.id))
            .flat_map(|f| [f.home_team, f.away_team])
            .collect();

        let mut builder = self.builder(snapshot, self.settings.free_hit_horizon);
        builder.initialize_variables(snapshot.players().filter(|p| playing.contains(&p.team)));
        self.full_squad_model(&mut builder);
        let squad = self.solve_and_select(&builder, SQUAD_SIZE)?;
        info!(
            players = squad.len(),
            teams_playing = playing.len(),
            "Recommended free-hit squad"
        );
        Ok(squad)
    }

    /// Improve `current_squad` using at most `free_transfers` swaps.
    /// Free transfers are clamped to [0, squad size]; zero returns the
    /// current squad unchanged.
    pub fn recommend_transfers(
        &self,
        snapshot: &LeagueSnapshot,
        current_squad: &[Player],
        free_transfers: i64,
    ) -> Result<TransferPlan, RecommendError> {
        let size = current_squad.len() as i64;
        let free_transfers = free_transfers.clamp(0, size);
        if free_transfers == 0 {
            info!("No free transfers; keeping current squad");
            return Ok(TransferPlan {
                squad: current_squad.to_vec(),
                transfers: Vec::new(),
            });
        }

        let mut builder = self.builder(snapshot, self.settings.squad_horizon);
        builder.initialize_variables(snapshot.players());
        self.full_squad_model(&mut builder);
        let minimum_to_keep = (size - free_transfers) as u32;
        builder.add_retain_current_squad_constraint(current_squad, minimum_to_keep);
        let squad = self.solve_and_select(&builder, SQUAD_SIZE)?;

        let transfers = pair_transfers(current_squad, &squad);
        info!(
            free_transfers,
            transfers = transfers.len(),
            "Recommended transfers"
        );
        Ok(TransferPlan { squad, transfers })
    }

    /// Best 11 from the current squad for the next game-week.
    pub fn recommend_starting_xi(
        &self,
        snapshot: &LeagueSnapshot,
        current_squad: &[Player],
    ) -> Result<Vec<Player>, RecommendError> {
        let mut builder = self.builder(snapshot, NEXT_GAME_WEEK);
        builder
            .initialize_variables(current_squad)
            .add_ranged_position_quota_constraint()
            .add_fixed_count_constraint(STARTING_XI_SIZE);
        self.solve_and_select(&builder, STARTING_XI_SIZE)
    }

    /// Top `n` players of one position.
    pub fn recommend_by_position(
        &self,
        snapshot: &LeagueSnapshot,
        position: Position,
        n: u32,
    ) -> Result<Vec<Player>, RecommendError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut builder = self.builder(snapshot, self.settings.squad_horizon);
        builder
            .initialize_variables(snapshot.players().filter(|p| p.position == position))
            .add_fixed_count_constraint(n);
        self.solve_and_select(&builder, n)
    }

    /// Top `n` players owned by at most `max_ownership` percent of managers,
    /// optionally restricted to one position. `None` uses the configured
    /// ownership ceiling.
    pub fn recommend_differentials(
        &self,
        snapshot: &LeagueSnapshot,
        position: Option<Position>,
        n: u32,
        max_ownership: Option<f64>,
    ) -> Result<Vec<Player>, RecommendError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let ceiling = max_ownership.unwrap_or(self.settings.differential_max_ownership);
        let mut builder = self.builder(snapshot, self.settings.squad_horizon);
        builder
            .initialize_variables(snapshot.players().filter(|p| {
                p.ownership_percent <= ceiling && position.map_or(true, |pos| p.position == pos)
            }))
            .add_fixed_count_constraint(n);
        self.solve_and_select(&builder, n)
    }

    // -----------------------------------------------------------------------
    // Manager-id convenience paths
    // -----------------------------------------------------------------------

    pub async fn recommend_transfers_for_manager(
        &self,
        ctx: &FplContext,
        manager_id: ManagerId,
        free_transfers: i64,
    ) -> Result<TransferPlan, RecommendError> {
        let snapshot = ctx.snapshot().await?;
        let squad = ctx.manager_squad(manager_id).await?;
        self.recommend_transfers(&snapshot, &squad, free_transfers)
    }

    pub async fn recommend_starting_xi_for_manager(
        &self,
        ctx: &FplContext,
        manager_id: ManagerId,
    ) -> Result<Vec<Player>, RecommendError> {
        let snapshot = ctx.snapshot().await?;
        let squad = ctx.manager_squad(manager_id).await?;
        self.recommend_starting_xi(&snapshot, &squad)
    }
}

/// Pair outgoing with incoming players, same position first.
fn pair_transfers(current: &[Player], recommended: &[Player]) -> Vec<(Player, Player)> {
    let kept: HashSet<PlayerId> = recommended.iter().map(|p| p.id).collect();
    let current_ids: HashSet<PlayerId> = current.iter().map(|p| p.id).collect();
    let mut outs: Vec<&Player> = current.iter().filter(|p| !kept.contains(&p.id)).collect();
    let mut ins: Vec<&Player> = recommended
        .iter()
        .filter(|p| !current_ids.contains(&p.id))
        .collect();

    let mut pairs = Vec::with_capacity(outs.len().min(ins.len()));
    outs.retain(|out| {
        match ins.iter().position(|p| p.position == out.position) {
            Some(i) => {
                pairs.push(((*out).clone(), ins.remove(i).clone()));
                false
            }
            None => true,
        }
    });
    pairs.extend(
        outs.into_iter()
            .zip(ins)
            .map(|(out, inc)| (out.clone(), inc.clone())),
    );
    pairs
}
