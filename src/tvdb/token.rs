//! Bearer-token acquisition and caching for TVDB.
//!
//! The broker owns the token for the life of the session. The cache slot
//! sits behind a `tokio::sync::Mutex` that is held across the login call:
//! concurrent callers queue on the lock, and everyone behind the first
//! caller observes the freshly cached token. That gives at-most-one login
//! request in flight without a separate pending-future map.

use crate::tvdb::client::{TvdbClient, LOGIN_TIMEOUT};
use crate::tvdb::errors::TvdbError;
use crate::tvdb::models::AuthResponse;
use reqwest::Method;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// TVDB tokens are good for about a month; renew well before that.
const TOKEN_VALIDITY: Duration = Duration::from_secs(25 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct TokenBroker {
    api_key: Option<String>,
    validity: Duration,
    state: Mutex<Option<CachedToken>>,
}

impl TokenBroker {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            validity: TOKEN_VALIDITY,
            state: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn with_validity(api_key: Option<String>, validity: Duration) -> Self {
        Self {
            api_key,
            validity,
            state: Mutex::new(None),
        }
    }

    /// Return the cached token, logging in first if it is missing or
    /// expired.
    ///
    /// A failed login leaves the cache slot empty, so the next caller
    /// retries; failures are never cached.
    pub async fn bearer_token(&self, client: &TvdbClient) -> Result<String, TvdbError> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }

        let api_key = self.api_key.as_deref().ok_or(TvdbError::MissingApiKey)?;

        let response: AuthResponse = client
            .request(
                Method::POST,
                "/login",
                Some(&json!({ "apikey": api_key })),
                &[],
                None,
                LOGIN_TIMEOUT,
            )
            .await?;

        let token = response
            .data
            .and_then(|d| d.token)
            .ok_or_else(|| TvdbError::Auth("login response missing token".to_string()))?;

        *state = Some(CachedToken {
            value: token.clone(),
            expires_at: Instant::now() + self.validity,
        });
        log::info!("TVDB login successful; token cached");

        Ok(token)
    }

    /// Drop any cached token so the next call logs in again.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }
}
