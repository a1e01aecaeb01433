//! Typed errors for the discovery engine.
//!
//! These never reach the UI layer: the engine's public section builders
//! log them and return empty lists, so the home screen always renders.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum DiscoveryError {
    /// The local library query failed.
    #[error("Library error: {0}")]
    Library(String),
}
