// Explicit, shareable handle on the league data: one data source, one set of
// typed caches, one retry policy. Construct once and pass by reference.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::entity::{
    GameWeekId, LeagueId, LeagueStanding, Manager, ManagerId, ManagerPick, Player,
};
use crate::error::{FplError, SourceError};
use crate::records::{
    BootstrapRecord, FixtureRecord, ManagerHistoryRecord, ManagerRecord, PicksRecord,
};
use crate::retry::RetryPolicy;
use crate::snapshot::LeagueSnapshot;
use crate::source::{DataSource, HttpDataSource};
use crate::standings::{StandingsCache, StandingsPager};

struct Caches {
    bootstrap: ExpiringCache<(), Arc<BootstrapRecord>>,
    fixtures: ExpiringCache<(), Arc<Vec<FixtureRecord>>>,
    snapshot: ExpiringCache<(), Arc<LeagueSnapshot>>,
    picks: ExpiringCache<(ManagerId, GameWeekId), Arc<PicksRecord>>,
    managers: ExpiringCache<ManagerId, Arc<ManagerRecord>>,
    histories: ExpiringCache<ManagerId, Arc<ManagerHistoryRecord>>,
    standings: Arc<StandingsCache>,
}

impl Caches {
    fn new(flush_interval: Duration) -> Self {
        Self {
            bootstrap: ExpiringCache::new("bootstrap", flush_interval),
            fixtures: ExpiringCache::new("fixtures", flush_interval),
            snapshot: ExpiringCache::new("snapshot", flush_interval),
            picks: ExpiringCache::new("picks", flush_interval),
            managers: ExpiringCache::new("managers", flush_interval),
            histories: ExpiringCache::new("histories", flush_interval),
            standings: Arc::new(ExpiringCache::new("standings", flush_interval)),
        }
    }
}

pub struct FplContext {
    source: Arc<dyn DataSource>,
    retry: RetryPolicy,
    caches: Caches,
}

impl FplContext {
    pub fn new(source: Arc<dyn DataSource>, flush_interval: Duration, retry: RetryPolicy) -> Self {
        Self {
            source,
            retry,
            caches: Caches::new(flush_interval),
        }
    }

    /// Build a context over the HTTP data source described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let source = HttpDataSource::new(&config.api)?;
        info!(
            base_url = %config.api.base_url,
            flush_secs = config.cache.flush_interval_secs,
            "Data context ready"
        );
        Ok(Self::new(
            Arc::new(source),
            config.cache.flush_interval(),
            RetryPolicy::from_config(&config.retry),
        ))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // -----------------------------------------------------------------------
    // Season data
    // -----------------------------------------------------------------------

    pub async fn bootstrap(&self) -> Result<Arc<BootstrapRecord>, FplError> {
        let source = self.source.as_ref();
        let retry = self.retry;
        let value = self
            .caches
            .bootstrap
            .get_or_fetch((), move || async move {
                retry
                    .run("bootstrap", move || source.fetch_bootstrap())
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(value)
    }

    pub async fn fixtures(&self) -> Result<Arc<Vec<FixtureRecord>>, FplError> {
        let source = self.source.as_ref();
        let retry = self.retry;
        let value = self
            .caches
            .fixtures
            .get_or_fetch((), move || async move {
                retry
                    .run("fixtures", move || source.fetch_fixtures())
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(value)
    }

    /// The indexed snapshot for the current freshness window. Rebuilt only
    /// after the caches flush.
    pub async fn snapshot(&self) -> Result<Arc<LeagueSnapshot>, FplError> {
        self.caches
            .snapshot
            .get_or_fetch((), move || async move {
                let bootstrap = self.bootstrap().await?;
                let fixtures = self.fixtures().await?;
                Ok::<_, FplError>(Arc::new(LeagueSnapshot::from_records(
                    &bootstrap, &fixtures,
                )))
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Managers
    // -----------------------------------------------------------------------

    pub async fn manager_picks(
        &self,
        manager_id: ManagerId,
        game_week_id: GameWeekId,
    ) -> Result<Vec<ManagerPick>, FplError> {
        let source = self.source.as_ref();
        let retry = self.retry;
        let record = self
            .caches
            .picks
            .get_or_fetch((manager_id, game_week_id), move || async move {
                retry
                    .run("manager picks", move || {
                        source.fetch_manager_picks(manager_id, game_week_id)
                    })
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(record.picks.iter().map(ManagerPick::from).collect())
    }

    /// A manager with their season history.
    pub async fn manager(&self, manager_id: ManagerId) -> Result<Manager, FplError> {
        let source = self.source.as_ref();
        let retry = self.retry;
        let record = self
            .caches
            .managers
            .get_or_fetch(manager_id, move || async move {
                retry
                    .run("manager", move || source.fetch_manager(manager_id))
                    .await
                    .map(Arc::new)
            })
            .await?;
        let history = self
            .caches
            .histories
            .get_or_fetch(manager_id, move || async move {
                retry
                    .run("manager history", move || {
                        source.fetch_manager_history(manager_id)
                    })
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(Manager::from_records(&record, &history.current))
    }

    /// The players a manager picked for the current game-week, in slot order.
    pub async fn manager_squad(&self, manager_id: ManagerId) -> Result<Vec<Player>, FplError> {
        let snapshot = self.snapshot().await?;
        let current = snapshot.current_game_week()?.id;
        let mut picks = self.manager_picks(manager_id, current).await?;
        picks.sort_by_key(|p| p.slot);
        let ids: Vec<_> = picks.iter().map(|p| p.player_id).collect();
        let squad = snapshot.players_by_ids(&ids)?;
        debug!(manager_id, game_week = current, players = squad.len(), "Resolved manager squad");
        Ok(squad)
    }

    // -----------------------------------------------------------------------
    // Leagues
    // -----------------------------------------------------------------------

    pub fn standings(&self, league_id: LeagueId) -> StandingsPager {
        StandingsPager::new(Arc::clone(&self.source), self.retry, league_id)
            .with_cache(Arc::clone(&self.caches.standings))
    }

    /// Every standing row of a league, each paired with the manager's
    /// details and history.
    pub async fn league_managers(
        &self,
        league_id: LeagueId,
    ) -> Result<Vec<(LeagueStanding, Manager)>, FplError> {
        let rows = self.standings(league_id).collect_all().await?;
        info!(league_id, managers = rows.len(), "Loading league managers");
        let mut managers = Vec::with_capacity(rows.len());
        for row in rows {
            let manager = self.manager(row.manager_id).await?;
            managers.push((row, manager));
        }
        Ok(managers)
    }
}
