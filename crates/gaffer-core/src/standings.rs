// Finite, restartable walk over a classic league's standings pages.

use std::sync::Arc;

use tracing::debug;

use crate::cache::ExpiringCache;
use crate::entity::{LeagueId, LeagueStanding};
use crate::error::FplError;
use crate::records::LeagueStandingsRecord;
use crate::retry::RetryPolicy;
use crate::source::DataSource;

pub type StandingsCache = ExpiringCache<(LeagueId, u32), Arc<LeagueStandingsRecord>>;

/// Pages are numbered from 1. The pager is exhausted once a page reports
/// no successor; `restart` rewinds to the first page.
pub struct StandingsPager {
    source: Arc<dyn DataSource>,
    retry: RetryPolicy,
    cache: Option<Arc<StandingsCache>>,
    league_id: LeagueId,
    next_page: u32,
    exhausted: bool,
    league_name: Option<String>,
}

impl StandingsPager {
    pub fn new(source: Arc<dyn DataSource>, retry: RetryPolicy, league_id: LeagueId) -> Self {
        Self {
            source,
            retry,
            cache: None,
            league_id,
            next_page: 1,
            exhausted: false,
            league_name: None,
        }
    }

    /// Serve pages through a shared cache.
    pub fn with_cache(mut self, cache: Arc<StandingsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn league_id(&self) -> LeagueId {
        self.league_id
    }

    /// League name, known once the first page has been fetched.
    pub fn league_name(&self) -> Option<&str> {
        self.league_name.as_deref()
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn restart(&mut self) {
        self.next_page = 1;
        self.exhausted = false;
    }

    /// Fetch the next page. Returns `Ok(None)` once exhausted. A failed fetch
    /// leaves the position unchanged so the same page can be retried.
    pub async fn next_page(&mut self) -> Result<Option<Vec<LeagueStanding>>, FplError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.next_page;
        let record = self.fetch(page).await?;
        debug!(
            league_id = self.league_id,
            page,
            rows = record.standings.results.len(),
            has_next = record.standings.has_next,
            "Fetched standings page"
        );

        self.league_name = Some(record.league.name.clone());
        self.exhausted = !record.standings.has_next;
        self.next_page += 1;
        Ok(Some(
            record
                .standings
                .results
                .iter()
                .map(LeagueStanding::from)
                .collect(),
        ))
    }

    /// Walk every remaining page and concatenate the rows.
    pub async fn collect_all(&mut self) -> Result<Vec<LeagueStanding>, FplError> {
        let mut rows = Vec::new();
        while let Some(page) = self.next_page().await? {
            rows.extend(page);
        }
        Ok(rows)
    }

    async fn fetch(&self, page: u32) -> Result<Arc<LeagueStandingsRecord>, FplError> {
        let league_id = self.league_id;
        let source = self.source.as_ref();
        let retry = self.retry;
        let fetch = move || async move {
            retry
                .run("league standings", move || {
                    source.fetch_league_standings(league_id, page)
                })
                .await
                .map(Arc::new)
        };
        let record = match &self.cache {
            Some(cache) => cache.get_or_fetch((league_id, page), fetch).await?,
            None => fetch().await?,
        };
        Ok(record)
    }
}
