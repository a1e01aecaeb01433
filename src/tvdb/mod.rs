//! TVDB v4 metadata pipeline.
//!
//! Layered bottom-up: `client` performs deadline-bounded HTTP calls,
//! `token` caches the bearer token with single-flight login, and `fetcher`
//! aggregates the six filter queries into a cached `CandidateSet`.

pub mod client;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod token;

pub use client::TvdbClient;
pub use errors::TvdbError;
pub use fetcher::CandidateFetcher;
pub use token::TokenBroker;
