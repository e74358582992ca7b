// League walks that outgrow the per-minute request cap.

use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gaffer_core::config::parse_config;
use gaffer_core::entity::{GameWeekId, LeagueId, ManagerId};
use gaffer_core::error::{FplError, SourceError};
use gaffer_core::records::{
    BootstrapRecord, FixtureRecord, LeagueStandingsRecord, ManagerHistoryRecord, ManagerRecord,
    PicksRecord,
};
use gaffer_core::retry::RetryPolicy;
use gaffer_core::source::{DataSource, RequestLimiter};
use gaffer_core::FplContext;
use governor::clock::FakeRelativeClock;
use tokio::time::Instant;

// ===========================================================================
// Helpers
// ===========================================================================

const LEAGUE: LeagueId = 314;

/// A league of `managers` entries behind a client-side request limiter. The
/// limiter's clock follows the (paused) tokio clock, so retry sleeps free up
/// request slots.
struct CappedLeague {
    managers: u64,
    limiter: RequestLimiter<FakeRelativeClock>,
    clock: FakeRelativeClock,
    synced_at: Mutex<Instant>,
    served: AtomicU32,
    refused: AtomicU32,
}

impl CappedLeague {
    fn new(managers: u64, per_minute: u32) -> Self {
        let clock = FakeRelativeClock::default();
        let limit = NonZeroU32::new(per_minute).unwrap();
        Self {
            managers,
            limiter: RequestLimiter::with_clock(limit, clock.clone()),
            clock,
            synced_at: Mutex::new(Instant::now()),
            served: AtomicU32::new(0),
            refused: AtomicU32::new(0),
        }
    }

    fn admit(&self, url: &str) -> Result<(), SourceError> {
        let now = Instant::now();
        {
            let mut synced_at = self.synced_at.lock().unwrap();
            self.clock.advance(now - *synced_at);
            *synced_at = now;
        }
        match self.limiter.try_acquire() {
            Ok(()) => {
                self.served.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(wait) => {
                self.refused.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::RateLimited {
                    url: url.into(),
                    retry_after: Some(wait),
                })
            }
        }
    }
}

#[async_trait]
impl DataSource for CappedLeague {
    async fn fetch_bootstrap(&self) -> Result<BootstrapRecord, SourceError> {
        unreachable!("league walks do not load bootstrap data")
    }

    async fn fetch_fixtures(&self) -> Result<Vec<FixtureRecord>, SourceError> {
        unreachable!("league walks do not load fixtures")
    }

    async fn fetch_manager_picks(
        &self,
        _manager_id: ManagerId,
        _game_week_id: GameWeekId,
    ) -> Result<PicksRecord, SourceError> {
        unreachable!("league walks do not load picks")
    }

    async fn fetch_manager(&self, manager_id: ManagerId) -> Result<ManagerRecord, SourceError> {
        self.admit(&format!("entry/{manager_id}/"))?;
        Ok(ManagerRecord {
            id: manager_id,
            player_first_name: "Manager".into(),
            player_last_name: manager_id.to_string(),
            name: format!("Team {manager_id}"),
        })
    }

    async fn fetch_manager_history(
        &self,
        manager_id: ManagerId,
    ) -> Result<ManagerHistoryRecord, SourceError> {
        self.admit(&format!("entry/{manager_id}/history/"))?;
        let json = format!(
            r#"{{"current": [
                {{"event": 1, "points": 50, "total_points": 50}},
                {{"event": 2, "points": {}, "total_points": {}}}
            ]}}"#,
            manager_id,
            50 + manager_id
        );
        Ok(serde_json::from_str(&json).unwrap())
    }

    async fn fetch_league_standings(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<LeagueStandingsRecord, SourceError> {
        self.admit(&format!("leagues-classic/{league_id}/standings/"))?;
        let results: Vec<String> = (1..=self.managers)
            .map(|id| {
                format!(
                    r#"{{"entry": {id}, "entry_name": "Team {id}", "player_name": "Manager {id}",
                        "rank": {id}, "last_rank": {id}, "total": 100, "event_total": 50}}"#
                )
            })
            .collect();
        let json = format!(
            r#"{{"league": {{"id": {league_id}, "name": "Big League"}},
                "standings": {{"has_next": false, "page": {page}, "results": [{}]}}}}"#,
            results.join(",")
        );
        Ok(serde_json::from_str(&json).unwrap())
    }
}

fn shipped_retry_policy() -> (RetryPolicy, u32) {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../defaults/gaffer.toml"));
    let text = std::fs::read_to_string(path).unwrap();
    let config = parse_config(&text, path).unwrap();
    (
        RetryPolicy::from_config(&config.retry),
        config.api.max_requests_per_minute,
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn league_larger_than_cap_loads_with_shipped_defaults() {
    let (retry, per_minute) = shipped_retry_policy();
    let source = Arc::new(CappedLeague::new(20, per_minute));
    let ctx = FplContext::new(
        Arc::clone(&source) as Arc<dyn DataSource>,
        Duration::from_secs(300),
        retry,
    );

    let managers = ctx.league_managers(LEAGUE).await.unwrap();

    assert_eq!(managers.len(), 20);
    // One standings page plus manager and history per entry.
    assert_eq!(source.served.load(Ordering::SeqCst), 41);
    assert!(41 > per_minute, "league must outgrow the cap");
    assert!(source.refused.load(Ordering::SeqCst) > 0);
    let (row, manager) = &managers[19];
    assert_eq!(row.manager_id, 20);
    assert_eq!(manager.history_for(2).unwrap().points, 20);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_policy_surfaces_the_cap() {
    let source = Arc::new(CappedLeague::new(20, 10));
    let ctx = FplContext::new(
        Arc::clone(&source) as Arc<dyn DataSource>,
        Duration::from_secs(300),
        RetryPolicy::none(),
    );

    let err = ctx.league_managers(LEAGUE).await.unwrap_err();
    match err {
        FplError::Source(ref e) => {
            assert!(e.is_rate_limited());
            assert!(e.retry_after().is_some());
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}
