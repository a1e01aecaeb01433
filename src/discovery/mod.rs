//! Home-screen discovery: candidate matching and section assembly.
//!
//! Reconciles remote catalog candidates against the local library and
//! builds the "New & Popular" and "Top picks" sections.

pub mod engine;
pub mod errors;
pub mod matching;
pub mod timeout;

pub use engine::{DiscoveryEngine, HomeItem};
pub use errors::DiscoveryError;
pub use matching::{match_candidates, normalize_title};
pub use timeout::with_fallback;
