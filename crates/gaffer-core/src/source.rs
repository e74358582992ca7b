// Upstream data source seam and its HTTP implementation.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::entity::{GameWeekId, LeagueId, ManagerId};
use crate::error::SourceError;
use crate::records::{
    BootstrapRecord, FixtureRecord, LeagueStandingsRecord, ManagerHistoryRecord, ManagerRecord,
    PicksRecord,
};

/// Raw league data retrieval. Implementations do no caching or retrying;
/// `FplContext` layers both on top.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_bootstrap(&self) -> Result<BootstrapRecord, SourceError>;

    async fn fetch_fixtures(&self) -> Result<Vec<FixtureRecord>, SourceError>;

    async fn fetch_manager_picks(
        &self,
        manager_id: ManagerId,
        game_week_id: GameWeekId,
    ) -> Result<PicksRecord, SourceError>;

    async fn fetch_manager(&self, manager_id: ManagerId) -> Result<ManagerRecord, SourceError>;

    async fn fetch_manager_history(
        &self,
        manager_id: ManagerId,
    ) -> Result<ManagerHistoryRecord, SourceError>;

    async fn fetch_league_standings(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<LeagueStandingsRecord, SourceError>;
}

// ---------------------------------------------------------------------------
// Request limiter
// ---------------------------------------------------------------------------

/// Client-side cap on requests per minute, backed by a GCRA limiter. The full
/// quota is available as a burst; after that one request frees up every
/// `60s / limit`.
pub struct RequestLimiter<C: Clock = DefaultClock> {
    limiter: RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>,
    clock: C,
}

impl RequestLimiter {
    pub fn per_minute(limit: NonZeroU32) -> Self {
        Self::with_clock(limit, DefaultClock::default())
    }
}

impl<C: Clock> RequestLimiter<C> {
    pub fn with_clock(limit: NonZeroU32, clock: C) -> Self {
        let limiter = RateLimiter::direct_with_clock(Quota::per_minute(limit), &clock);
        Self { limiter, clock }
    }

    /// Take a slot if one is free. Otherwise returns how long until the next
    /// slot opens.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

// ---------------------------------------------------------------------------
// HttpDataSource
// ---------------------------------------------------------------------------

pub struct HttpDataSource<C: Clock = DefaultClock> {
    http: reqwest::Client,
    base_url: String,
    limiter: RequestLimiter<C>,
}

impl HttpDataSource {
    pub fn new(config: &ApiConfig) -> Result<Self, SourceError> {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock> HttpDataSource<C> {
    /// Build a source whose request limiter reads time from `clock`.
    pub fn with_clock(config: &ApiConfig, clock: C) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| SourceError::Network {
                url: config.base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            limiter: RequestLimiter::with_clock(per_minute_limit(config), clock),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);

        if let Err(wait) = self.limiter.try_acquire() {
            warn!(%url, wait_ms = wait.as_millis() as u64, "Client-side request cap reached");
            return Err(SourceError::RateLimited {
                url,
                retry_after: Some(wait),
            });
        }

        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_header(&response);
            return Err(SourceError::RateLimited { url, retry_after });
        }
        if !status.is_success() {
            return Err(SourceError::Network {
                url,
                message: format!("unexpected status {status}"),
            });
        }

        let body = response.bytes().await.map_err(|e| SourceError::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|source| SourceError::Decode { url, source })
    }
}

/// Validation rejects a zero cap; treat one that slips through as a single
/// request per minute.
fn per_minute_limit(config: &ApiConfig) -> NonZeroU32 {
    NonZeroU32::new(config.max_requests_per_minute).unwrap_or(NonZeroU32::MIN)
}

/// Delay-seconds form of `Retry-After`. The HTTP-date form is ignored.
fn retry_after_header(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl<C> DataSource for HttpDataSource<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn fetch_bootstrap(&self) -> Result<BootstrapRecord, SourceError> {
        self.get_json("bootstrap-static/").await
    }

    async fn fetch_fixtures(&self) -> Result<Vec<FixtureRecord>, SourceError> {
        self.get_json("fixtures/").await
    }

    async fn fetch_manager_picks(
        &self,
        manager_id: ManagerId,
        game_week_id: GameWeekId,
    ) -> Result<PicksRecord, SourceError> {
        self.get_json(&format!("entry/{manager_id}/event/{game_week_id}/picks/"))
            .await
    }

    async fn fetch_manager(&self, manager_id: ManagerId) -> Result<ManagerRecord, SourceError> {
        self.get_json(&format!("entry/{manager_id}/")).await
    }

    async fn fetch_manager_history(
        &self,
        manager_id: ManagerId,
    ) -> Result<ManagerHistoryRecord, SourceError> {
        self.get_json(&format!("entry/{manager_id}/history/")).await
    }

    async fn fetch_league_standings(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<LeagueStandingsRecord, SourceError> {
        self.get_json(&format!(
            "leagues-classic/{league_id}/standings/?page_standings={page}"
        ))
        .await
    }
}
