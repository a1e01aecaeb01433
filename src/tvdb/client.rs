//! Timeout-bounded HTTP client for the TVDB v4 API.
//!
//! Every call carries a hard per-request deadline; on expiry the transport
//! is aborted and the call fails with `TvdbError::Timeout`. The bearer
//! token is attached only when supplied, so login calls go out bare.

use crate::tvdb::errors::TvdbError;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Deadline for data requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(4500);
/// Login gets a little longer; it gates everything else.
pub const LOGIN_TIMEOUT: Duration = Duration::from_millis(6000);

#[derive(Debug, Clone)]
pub struct TvdbClient {
    client: Client,
    base_url: String,
}

impl TvdbClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Perform a single API call and deserialize the JSON response.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<T, TvdbError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);

        let mut request = self
            .client
            .request(method, &url)
            .timeout(timeout)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TvdbError::from_transport(e, path))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TvdbError::Auth(format!("status {}", status.as_u16())));
        }
        if !status.is_success() {
            log::debug!("TVDB request to {} failed with status {}", path, status);
            return Err(TvdbError::Http(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TvdbError::from_transport(e, path))
    }
}
