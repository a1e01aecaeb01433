//! Discovery core for the Marquee media center.
//!
//! Wraps a Jellyfin-compatible library and the TVDB v4 catalog behind two
//! home-screen section builders: "New & Popular" and "Top picks". The UI
//! layer renders whatever these return; on any internal failure they
//! return empty lists so the home screen never shows an error state for
//! discovery.

pub mod config;
pub mod discovery;
pub mod errors;
pub mod jellyfin;
pub mod models;
pub mod providers;
pub mod tvdb;

pub use config::AppConfig;
pub use discovery::{DiscoveryEngine, HomeItem};
pub use errors::AppError;
pub use jellyfin::JellyfinProvider;
pub use models::{Candidate, CandidateKind, CandidateSet, LibraryItem, MediaKind};
pub use providers::{CandidateProvider, LibraryProvider};
pub use tvdb::CandidateFetcher;

use std::sync::Arc;

/// Wire up the standard engine from application configuration: a Jellyfin
/// library provider plus the TVDB candidate fetcher.
pub fn build_engine(config: &AppConfig) -> Result<DiscoveryEngine, AppError> {
    let jellyfin = config
        .jellyfin
        .as_ref()
        .ok_or_else(|| AppError::Config("Jellyfin server is not configured".to_string()))?;

    let library = Arc::new(JellyfinProvider::from_config(jellyfin));
    let candidates = Arc::new(CandidateFetcher::from_config(&config.tvdb));

    Ok(DiscoveryEngine::new(library, candidates))
}
