//! Home-screen section builders.
//!
//! Produces the two discovery sections:
//! - "New & Popular": remote candidates matched into the library, merged
//!   with recency- and rating-derived local lists.
//! - "Top picks": unplayed items scored against a genre taste profile
//!   built from watch history.
//!
//! Both builders are non-critical to the page: internal failures are
//! logged and surface as empty lists, never as errors.

use crate::discovery::errors::DiscoveryError;
use crate::discovery::matching::match_candidates;
use crate::discovery::timeout::with_fallback;
use crate::models::{CandidateSet, LibraryItem};
use crate::providers::traits::{CandidateProvider, LibraryProvider};
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Maximum items per rendered section.
const SECTION_LIMIT: usize = 24;

/// Candidates requested per category; generous because most won't match
/// anything in the library.
const CANDIDATE_FETCH_LIMIT: usize = 80;

/// How long "New & Popular" waits for the remote candidate fetch before
/// proceeding with local data only.
const REMOTE_WAIT_BUDGET: Duration = Duration::from_millis(1800);

/// A library item ready to render as a home-screen card.
#[derive(Debug, Clone, Serialize)]
pub struct HomeItem {
    pub item: LibraryItem,
    /// Marks items sourced from the recency-driven sub-lists; the UI shows
    /// a "new" badge for these.
    pub is_new: bool,
}

/// Builds the discovery sections from a library provider and a remote
/// candidate provider.
///
/// Created once and shared; holds no per-request state of its own.
pub struct DiscoveryEngine {
    library: Arc<dyn LibraryProvider>,
    candidates: Arc<dyn CandidateProvider>,
    remote_budget: Duration,
}

impl DiscoveryEngine {
    pub fn new(library: Arc<dyn LibraryProvider>, candidates: Arc<dyn CandidateProvider>) -> Self {
        Self {
            library,
            candidates,
            remote_budget: REMOTE_WAIT_BUDGET,
        }
    }

    #[cfg(test)]
    fn with_remote_budget(
        library: Arc<dyn LibraryProvider>,
        candidates: Arc<dyn CandidateProvider>,
        remote_budget: Duration,
    ) -> Self {
        Self {
            library,
            candidates,
            remote_budget,
        }
    }

    /// The "New & Popular" section, at most 24 items.
    pub async fn new_and_popular(&self, user_id: &str) -> Vec<HomeItem> {
        match self.build_new_and_popular(user_id).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("New & Popular section failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn build_new_and_popular(&self, user_id: &str) -> Result<Vec<HomeItem>, DiscoveryError> {
        // Library snapshot and remote candidates in parallel; the remote
        // fetch is raced against its budget so a slow provider can only
        // cost us its matches, never the section.
        let candidate_fut = with_fallback(
            self.candidates.candidates(CANDIDATE_FETCH_LIMIT),
            self.remote_budget,
            CandidateSet::default(),
        );
        let (library, candidate_set) =
            tokio::join!(self.library.recent_items(user_id), candidate_fut);
        let library = library.map_err(|e| DiscoveryError::Library(e.to_string()))?;

        let now = Utc::now();

        let fresh_local = sort_by_most_recent(filter_within_months(&library, 2, now));
        let new_matches: Vec<LibraryItem> = match_candidates(&library, &candidate_set.new_titles)
            .into_iter()
            .filter(|item| within_months(item, 2, now))
            .collect();
        let popular_matches: Vec<LibraryItem> =
            match_candidates(&library, &candidate_set.popular_titles)
                .into_iter()
                .filter(|item| within_months(item, 6, now))
                .collect();
        let rated_local = sort_by_rating(filter_within_months(&library, 6, now));

        let mut used_ids = HashSet::new();
        let mut merged = Vec::new();
        append_unique(&mut merged, &mut used_ids, fresh_local, true);
        append_unique(&mut merged, &mut used_ids, new_matches, true);
        append_unique(&mut merged, &mut used_ids, popular_matches, false);
        append_unique(&mut merged, &mut used_ids, rated_local, false);
        merged.truncate(SECTION_LIMIT);

        if !merged.is_empty() {
            return Ok(merged);
        }

        // Nothing recent at all: fall back to the best-rated items.
        Ok(sort_by_rating(library)
            .into_iter()
            .take(SECTION_LIMIT)
            .map(|item| HomeItem {
                item,
                is_new: false,
            })
            .collect())
    }

    /// The "Top picks" section, at most 24 unplayed items.
    pub async fn top_picks(&self, user_id: &str) -> Vec<LibraryItem> {
        match self.build_top_picks(user_id).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Top picks section failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn build_top_picks(&self, user_id: &str) -> Result<Vec<LibraryItem>, DiscoveryError> {
        let (library, watched) = tokio::join!(
            self.library.recent_items(user_id),
            self.library.watched_items(user_id)
        );
        let library = library.map_err(|e| DiscoveryError::Library(e.to_string()))?;
        let watched = watched.map_err(|e| DiscoveryError::Library(e.to_string()))?;

        let taste = genre_taste_profile(&watched);

        let mut scored: Vec<(LibraryItem, f64)> = library
            .into_iter()
            .filter(|item| !item.played)
            .map(|item| {
                let score = taste_score(&item, &taste);
                (item, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(SECTION_LIMIT)
            .map(|(item, _)| item)
            .collect())
    }
}

fn append_unique(
    merged: &mut Vec<HomeItem>,
    used_ids: &mut HashSet<String>,
    items: Vec<LibraryItem>,
    is_new: bool,
) {
    for item in items {
        if !used_ids.insert(item.id.clone()) {
            continue;
        }
        merged.push(HomeItem { item, is_new });
    }
}

fn within_months(item: &LibraryItem, months: u32, now: DateTime<Utc>) -> bool {
    let Some(reference) = item.reference_date() else {
        return false;
    };
    match now.checked_sub_months(Months::new(months)) {
        Some(threshold) => reference >= threshold,
        None => false,
    }
}

fn filter_within_months(items: &[LibraryItem], months: u32, now: DateTime<Utc>) -> Vec<LibraryItem> {
    items
        .iter()
        .filter(|item| within_months(item, months, now))
        .cloned()
        .collect()
}

fn sort_by_most_recent(mut items: Vec<LibraryItem>) -> Vec<LibraryItem> {
    items.sort_by_key(|item| {
        Reverse(
            item.reference_date()
                .map(|date| date.timestamp_millis())
                .unwrap_or(0),
        )
    });
    items
}

fn sort_by_rating(mut items: Vec<LibraryItem>) -> Vec<LibraryItem> {
    items.sort_by(|a, b| {
        b.community_rating
            .unwrap_or(0.0)
            .total_cmp(&a.community_rating.unwrap_or(0.0))
    });
    items
}

/// Accumulate genre weights from watch history, most recent first.
///
/// Each watched item adds `max(1, 12 - index/20)` to each of its genres,
/// so recent watches count more and the weight decays every 20 items.
/// The formula is an empirical heuristic kept for behavioral parity.
fn genre_taste_profile(watched: &[LibraryItem]) -> HashMap<String, u32> {
    let mut weights: HashMap<String, u32> = HashMap::new();
    for (index, item) in watched.iter().enumerate() {
        let recency_weight = std::cmp::max(1, 12 - (index / 20) as i64) as u32;
        for genre in &item.genres {
            *weights.entry(genre.to_lowercase()).or_insert(0) += recency_weight;
        }
    }
    weights
}

fn taste_score(item: &LibraryItem, taste: &HashMap<String, u32>) -> f64 {
    let genre_boost: u32 = item
        .genres
        .iter()
        .filter_map(|genre| taste.get(&genre.to_lowercase()))
        .sum();
    let rating_boost = f64::from(item.community_rating.unwrap_or(0.0)) * 2.0;
    f64::from(genre_boost) + rating_boost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, CandidateKind, MediaKind};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use std::time::Instant;

    struct StubLibrary {
        items: Vec<LibraryItem>,
        watched: Vec<LibraryItem>,
    }

    #[async_trait]
    impl LibraryProvider for StubLibrary {
        fn id(&self) -> &str {
            "stub"
        }

        async fn recent_items(&self, _user_id: &str) -> Result<Vec<LibraryItem>> {
            Ok(self.items.clone())
        }

        async fn watched_items(&self, _user_id: &str) -> Result<Vec<LibraryItem>> {
            Ok(self.watched.clone())
        }
    }

    struct FailingLibrary;

    #[async_trait]
    impl LibraryProvider for FailingLibrary {
        fn id(&self) -> &str {
            "failing"
        }

        async fn recent_items(&self, _user_id: &str) -> Result<Vec<LibraryItem>> {
            Err(anyhow!("library offline"))
        }

        async fn watched_items(&self, _user_id: &str) -> Result<Vec<LibraryItem>> {
            Err(anyhow!("library offline"))
        }
    }

    struct StubCandidates {
        set: CandidateSet,
    }

    #[async_trait]
    impl CandidateProvider for StubCandidates {
        fn id(&self) -> &str {
            "stub"
        }

        async fn candidates(&self, _limit: usize) -> CandidateSet {
            self.set.clone()
        }
    }

    /// Simulates a remote provider that never answers.
    struct StalledCandidates;

    #[async_trait]
    impl CandidateProvider for StalledCandidates {
        fn id(&self) -> &str {
            "stalled"
        }

        async fn candidates(&self, _limit: usize) -> CandidateSet {
            std::future::pending().await
        }
    }

    fn item(id: &str, name: &str, days_ago: i64, rating: f32) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            name: name.to_string(),
            kind: MediaKind::Movie,
            genres: vec![],
            community_rating: Some(rating),
            production_year: None,
            premiere_date: Some(Utc::now() - TimeDelta::days(days_ago)),
            date_created: None,
            played: false,
            cover_url: None,
        }
    }

    fn candidate(title: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            year: None,
            score: None,
            kind: MediaKind::Movie,
            source: CandidateKind::Popular,
        }
    }

    fn engine(library: StubLibrary, candidates: impl CandidateProvider + 'static) -> DiscoveryEngine {
        DiscoveryEngine::new(Arc::new(library), Arc::new(candidates))
    }

    #[tokio::test]
    async fn test_merge_priority_and_new_flags() {
        // "fresh" is within 2 months, "seasonal" only matches via the
        // popular candidates, "classic" rides in on rating.
        let library = StubLibrary {
            items: vec![
                item("fresh", "Fresh Release", 10, 5.0),
                item("seasonal", "Seasonal Hit", 100, 6.0),
                item("classic", "Old Favorite", 120, 9.5),
            ],
            watched: vec![],
        };
        let candidates = StubCandidates {
            set: CandidateSet {
                new_titles: vec![],
                popular_titles: vec![candidate("Seasonal Hit")],
            },
        };

        let section = engine(library, candidates).new_and_popular("u1").await;

        let ids: Vec<&str> = section.iter().map(|h| h.item.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "seasonal", "classic"]);
        assert!(section[0].is_new);
        assert!(!section[1].is_new);
        assert!(!section[2].is_new);
    }

    #[tokio::test]
    async fn test_first_occurrence_wins_in_merge() {
        // The same item qualifies as fresh-local and as a popular match;
        // it must appear once, flagged from its first (new) source.
        let library = StubLibrary {
            items: vec![item("dune", "Dune", 5, 8.0)],
            watched: vec![],
        };
        let candidates = StubCandidates {
            set: CandidateSet {
                new_titles: vec![],
                popular_titles: vec![candidate("Dune")],
            },
        };

        let section = engine(library, candidates).new_and_popular("u1").await;
        assert_eq!(section.len(), 1);
        assert!(section[0].is_new);
    }

    #[tokio::test]
    async fn test_section_truncated_to_24() {
        let items: Vec<LibraryItem> = (0..30)
            .map(|i| item(&format!("i{}", i), &format!("Title {}", i), 1, 5.0))
            .collect();
        let library = StubLibrary {
            items,
            watched: vec![],
        };
        let candidates = StubCandidates {
            set: CandidateSet::default(),
        };

        let section = engine(library, candidates).new_and_popular("u1").await;
        assert_eq!(section.len(), 24);
    }

    #[tokio::test]
    async fn test_empty_merge_falls_back_to_rating_order() {
        // Everything is older than 6 months, so the merge is empty.
        let library = StubLibrary {
            items: vec![
                item("mid", "Mid", 400, 5.0),
                item("best", "Best", 500, 9.0),
                item("worst", "Worst", 600, 2.0),
            ],
            watched: vec![],
        };
        let candidates = StubCandidates {
            set: CandidateSet::default(),
        };

        let section = engine(library, candidates).new_and_popular("u1").await;

        let ids: Vec<&str> = section.iter().map(|h| h.item.id.as_str()).collect();
        assert_eq!(ids, vec!["best", "mid", "worst"]);
        assert!(section.iter().all(|h| !h.is_new));
    }

    #[tokio::test]
    async fn test_stalled_remote_fetch_falls_back_to_local_data() {
        let library = StubLibrary {
            items: vec![item("fresh", "Fresh Release", 10, 5.0)],
            watched: vec![],
        };
        let engine = DiscoveryEngine::with_remote_budget(
            Arc::new(library),
            Arc::new(StalledCandidates),
            Duration::from_millis(50),
        );

        let started = Instant::now();
        let section = engine.new_and_popular("u1").await;

        assert_eq!(section.len(), 1);
        assert_eq!(section[0].item.id, "fresh");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_library_failure_yields_empty_sections() {
        let engine = DiscoveryEngine::new(
            Arc::new(FailingLibrary),
            Arc::new(StubCandidates {
                set: CandidateSet::default(),
            }),
        );

        assert!(engine.new_and_popular("u1").await.is_empty());
        assert!(engine.top_picks("u1").await.is_empty());
    }

    fn genre_item(id: &str, genres: &[&str], rating: f32, played: bool) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            name: id.to_string(),
            kind: MediaKind::Movie,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            community_rating: Some(rating),
            production_year: None,
            premiere_date: None,
            date_created: None,
            played,
            cover_url: None,
        }
    }

    #[tokio::test]
    async fn test_top_picks_prefers_watched_genres() {
        let library = StubLibrary {
            items: vec![
                genre_item("scifi", &["Science Fiction"], 5.0, false),
                genre_item("drama", &["Drama"], 5.0, false),
                genre_item("seen", &["Science Fiction"], 9.9, true),
            ],
            watched: vec![genre_item("w1", &["Science Fiction"], 7.0, true)],
        };
        let candidates = StubCandidates {
            set: CandidateSet::default(),
        };

        let picks = engine(library, candidates).top_picks("u1").await;

        let ids: Vec<&str> = picks.iter().map(|i| i.id.as_str()).collect();
        // Played items are excluded; the genre boost outranks equal ratings.
        assert_eq!(ids, vec!["scifi", "drama"]);
    }

    #[tokio::test]
    async fn test_top_picks_rating_breaks_genre_ties() {
        let library = StubLibrary {
            items: vec![
                genre_item("low", &["Drama"], 4.0, false),
                genre_item("high", &["Drama"], 8.0, false),
            ],
            watched: vec![],
        };
        let candidates = StubCandidates {
            set: CandidateSet::default(),
        };

        let picks = engine(library, candidates).top_picks("u1").await;
        let ids: Vec<&str> = picks.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low"]);
    }

    #[test]
    fn test_taste_profile_decays_every_20_items() {
        let watched: Vec<LibraryItem> = (0..21)
            .map(|i| genre_item(&format!("w{}", i), &["Horror"], 5.0, true))
            .collect();
        let single = genre_taste_profile(&watched[..1].to_vec());
        assert_eq!(single.get("horror"), Some(&12));

        let full = genre_taste_profile(&watched);
        // 20 items at weight 12, the 21st at weight 11.
        assert_eq!(full.get("horror"), Some(&(20 * 12 + 11)));
    }

    #[test]
    fn test_taste_profile_weight_never_drops_below_one() {
        let watched: Vec<LibraryItem> = (0..241)
            .map(|i| genre_item(&format!("w{}", i), &["Horror"], 5.0, true))
            .collect();
        let profile = genre_taste_profile(&watched);
        // Index 240 would be 12 - 12 = 0 without the clamp.
        let expected: u32 = (0..241)
            .map(|i| std::cmp::max(1, 12 - (i / 20) as i64) as u32)
            .sum();
        assert_eq!(profile.get("horror"), Some(&expected));
    }
}
