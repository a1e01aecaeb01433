use crate::models::{CandidateSet, LibraryItem};
use anyhow::Result;
use async_trait::async_trait;

/// Query interface over the user's local media library.
///
/// The discovery engine only ever reads from the library; implementations
/// wrap a media server's items API (see `jellyfin::JellyfinProvider`).
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// Unique identifier (e.g., "jellyfin")
    fn id(&self) -> &str;

    /// Movie and series items, most recently added first.
    ///
    /// This is the working snapshot everything else filters and scores;
    /// implementations should include genres, community rating, production
    /// year, release/creation dates and play state.
    async fn recent_items(&self, user_id: &str) -> Result<Vec<LibraryItem>>;

    /// Items the user has watched, most recently played first.
    async fn watched_items(&self, user_id: &str) -> Result<Vec<LibraryItem>>;
}

/// Source of remote "new" and "popular" title candidates.
///
/// Infallible by contract: implementations degrade failed sub-queries to
/// empty categories rather than surfacing errors to the engine.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    /// Unique identifier (e.g., "tvdb")
    fn id(&self) -> &str;

    /// Fetch up to `limit` candidates per category.
    async fn candidates(&self, limit: usize) -> CandidateSet;
}
