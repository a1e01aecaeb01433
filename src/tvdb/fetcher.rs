//! Aggregated "new and popular" candidate fetching.
//!
//! One fetch fans out into six filter queries ({movies, series} x
//! {current-year new, previous-year new, popular-by-score}), waits for all
//! of them to settle, and folds the successes into a `CandidateSet`. A
//! failed sub-query degrades to an empty list; the fetch itself never
//! fails. Results are cached per requested limit for a short TTL.

use crate::config::TvdbConfig;
use crate::models::{Candidate, CandidateKind, CandidateSet, MediaKind};
use crate::providers::traits::CandidateProvider;
use crate::tvdb::client::{TvdbClient, REQUEST_TIMEOUT};
use crate::tvdb::errors::TvdbError;
use crate::tvdb::models::{ApiResponse, BaseRecord};
use crate::tvdb::token::TokenBroker;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use futures_util::future::join_all;
use reqwest::Method;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// How long an aggregated candidate set remains valid.
const CANDIDATES_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

const DEFAULT_LANG: &str = "eng";
const DEFAULT_COUNTRY: &str = "usa";

const MOVIES_FILTER: &str = "/movies/filter";
const SERIES_FILTER: &str = "/series/filter";

struct CachedCandidates {
    value: CandidateSet,
    cached_at: Instant,
}

impl CachedCandidates {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Fetches and caches remote title candidates from TVDB.
///
/// Owns the HTTP client and token broker; designed to be created once and
/// shared behind an `Arc` as the engine's `CandidateProvider`.
pub struct CandidateFetcher {
    client: TvdbClient,
    tokens: TokenBroker,
    cache: Mutex<HashMap<usize, CachedCandidates>>,
    cache_ttl: Duration,
}

impl CandidateFetcher {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: TvdbClient::new(base_url),
            tokens: TokenBroker::new(api_key),
            cache: Mutex::new(HashMap::new()),
            cache_ttl: CANDIDATES_CACHE_TTL,
        }
    }

    pub fn from_config(config: &TvdbConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    /// Fetch up to `limit` candidates per category, serving from the
    /// per-limit cache when a fresh entry exists.
    pub async fn new_and_popular(&self, limit: usize) -> CandidateSet {
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&limit) {
                if !entry.is_expired(self.cache_ttl) {
                    log::debug!("Candidate cache hit for limit {}", limit);
                    return entry.value.clone();
                }
            }
        }

        let value = self.refresh(limit).await;

        let mut cache = self.cache.lock().await;
        cache.insert(
            limit,
            CachedCandidates {
                value: value.clone(),
                cached_at: Instant::now(),
            },
        );

        value
    }

    /// Drop all cached candidate sets.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    async fn refresh(&self, limit: usize) -> CandidateSet {
        let current_year = Utc::now().year();
        let previous_year = current_year - 1;

        // The first four queries feed the "new" category, the last two
        // feed "popular". All six are attempted regardless of failures.
        let queries = vec![
            self.fetch_filtered(MOVIES_FILTER, MediaKind::Movie, CandidateKind::New, "firstAired", Some(current_year)),
            self.fetch_filtered(SERIES_FILTER, MediaKind::Series, CandidateKind::New, "firstAired", Some(current_year)),
            self.fetch_filtered(MOVIES_FILTER, MediaKind::Movie, CandidateKind::New, "firstAired", Some(previous_year)),
            self.fetch_filtered(SERIES_FILTER, MediaKind::Series, CandidateKind::New, "firstAired", Some(previous_year)),
            self.fetch_filtered(MOVIES_FILTER, MediaKind::Movie, CandidateKind::Popular, "score", None),
            self.fetch_filtered(SERIES_FILTER, MediaKind::Series, CandidateKind::Popular, "score", None),
        ];

        let settled: Vec<Vec<Candidate>> = join_all(queries)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::debug!("TVDB sub-query failed: {}", e);
                    Vec::new()
                }
            })
            .collect();

        let (new_parts, popular_parts) = settled.split_at(4);

        let mut new_titles = dedupe_candidates(new_parts.concat());
        new_titles.truncate(limit);
        let mut popular_titles = dedupe_candidates(popular_parts.concat());
        popular_titles.truncate(limit);

        log::info!(
            "Fetched TVDB candidates: {} new, {} popular (limit {})",
            new_titles.len(),
            popular_titles.len(),
            limit
        );

        CandidateSet {
            new_titles,
            popular_titles,
        }
    }

    async fn fetch_filtered(
        &self,
        endpoint: &'static str,
        kind: MediaKind,
        source: CandidateKind,
        sort: &'static str,
        year: Option<i32>,
    ) -> Result<Vec<Candidate>, TvdbError> {
        let token = self.tokens.bearer_token(&self.client).await?;

        let mut query = vec![
            ("lang", DEFAULT_LANG.to_string()),
            ("country", DEFAULT_COUNTRY.to_string()),
            ("sort", sort.to_string()),
            ("sortType", "desc".to_string()),
        ];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let response: ApiResponse = self
            .client
            .request(Method::GET, endpoint, None, &query, Some(&token), REQUEST_TIMEOUT)
            .await?;

        Ok(map_records(response.into_records(), kind, source))
    }
}

#[async_trait]
impl CandidateProvider for CandidateFetcher {
    fn id(&self) -> &str {
        "tvdb"
    }

    async fn candidates(&self, limit: usize) -> CandidateSet {
        self.new_and_popular(limit).await
    }
}

/// Normalize raw provider records into candidates, dropping records with
/// no derivable title.
fn map_records(records: Vec<BaseRecord>, kind: MediaKind, source: CandidateKind) -> Vec<Candidate> {
    records
        .into_iter()
        .filter_map(|record| {
            let title = record.display_title()?;
            Some(Candidate {
                year: record.parsed_year(),
                score: record.score,
                title,
                kind,
                source,
            })
        })
        .collect()
}

/// Deduplicate by (kind, lowercased title, year); first occurrence wins.
fn dedupe_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.dedup_key()))
        .collect()
}
