use crate::config::JellyfinConfig;
use crate::models::LibraryItem;
use crate::providers::traits::LibraryProvider;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;

use super::models::*;

/// Fields requested for the working library snapshot; everything the
/// matcher and scorers need, nothing more.
const LIBRARY_FIELDS: &str =
    "Genres,CommunityRating,ProductionYear,UserData,Path,PremiereDate,DateCreated";
const WATCHED_FIELDS: &str = "Genres,DatePlayed,UserData";

/// The snapshot is capped; a library bigger than this only contributes its
/// most recently added titles to discovery.
const LIBRARY_FETCH_LIMIT: u32 = 1000;
const WATCHED_FETCH_LIMIT: u32 = 200;

pub struct JellyfinProvider {
    client: Client,
    pub server_url: String,
    user_id: String,
    access_token: String,
    device_id: String,
    initialized: bool,
}

impl JellyfinProvider {
    pub fn new(server_url: String) -> Self {
        Self {
            client: Client::new(),
            server_url,
            user_id: String::new(),
            access_token: String::new(),
            device_id: uuid::Uuid::new_v4().to_string(),
            initialized: false,
        }
    }

    pub fn with_config(server_url: String, user_id: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            server_url,
            user_id,
            access_token,
            device_id: uuid::Uuid::new_v4().to_string(),
            initialized: true,
        }
    }

    pub fn from_config(config: &JellyfinConfig) -> Self {
        match (&config.user_id, &config.access_token) {
            (Some(user_id), Some(token)) => Self::with_config(
                config.server_url.clone(),
                user_id.clone(),
                token.clone(),
            ),
            _ => Self::new(config.server_url.clone()),
        }
    }

    /// MediaBrowser authorization scheme; the token part is absent until a
    /// session exists (the login call itself goes out without one).
    fn media_browser_header(&self, token: Option<&str>) -> String {
        let mut header = format!(
            "MediaBrowser Client=\"Marquee\", Device=\"Desktop\", DeviceId=\"{}\", Version=\"0.1.0\"",
            self.device_id
        );
        if let Some(token) = token {
            header.push_str(&format!(", Token=\"{}\"", token));
        }
        header
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.media_browser_header(Some(&self.access_token))).unwrap(),
        );
        headers
    }

    fn image_url(&self, item_id: &str, max_width: u32) -> String {
        let base = self.server_url.trim_end_matches('/');
        format!(
            "{}/Items/{}/Images/Primary?maxWidth={}",
            base, item_id, max_width
        )
    }

    /// Exchange a username/password for a session, storing the returned
    /// user id and access token for subsequent item queries.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let base = self.server_url.trim_end_matches('/');
        let url = format!("{}/Users/AuthenticateByName", base);

        let body = serde_json::json!({
            "Username": username,
            "Pw": password
        });

        let resp: AuthenticationResult = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.media_browser_header(None))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        self.user_id = resp.user.id;
        self.access_token = resp.access_token;
        self.initialized = true;

        log::info!(
            "Jellyfin authentication successful for user: {}",
            resp.user.name
        );
        Ok(())
    }

    async fn fetch_items(&self, url: &str) -> Result<Vec<LibraryItem>> {
        if !self.initialized {
            return Err(anyhow!("Jellyfin provider not initialized"));
        }

        let resp: ItemsResult = self
            .client
            .get(url)
            .headers(self.headers())
            .send()
            .await?
            .json()
            .await?;

        Ok(resp
            .items
            .into_iter()
            .filter_map(|dto| {
                let cover = Some(self.image_url(&dto.id, 640));
                dto.into_library_item(cover)
            })
            .collect())
    }
}

#[async_trait]
impl LibraryProvider for JellyfinProvider {
    fn id(&self) -> &str {
        "jellyfin"
    }

    async fn recent_items(&self, user_id: &str) -> Result<Vec<LibraryItem>> {
        let base = self.server_url.trim_end_matches('/');
        let url = format!(
            "{}/Items?Recursive=true&IncludeItemTypes=Movie,Series&Limit={}&Fields={}&SortBy=DateCreated&SortOrder=Descending&EnableTotalRecordCount=false&UserId={}",
            base,
            LIBRARY_FETCH_LIMIT,
            LIBRARY_FIELDS,
            urlencoding::encode(user_id)
        );
        self.fetch_items(&url).await
    }

    async fn watched_items(&self, user_id: &str) -> Result<Vec<LibraryItem>> {
        let base = self.server_url.trim_end_matches('/');
        let url = format!(
            "{}/Items?Recursive=true&IncludeItemTypes=Movie,Series&Filters=IsPlayed&Limit={}&Fields={}&SortBy=DatePlayed&SortOrder=Descending&EnableTotalRecordCount=false&UserId={}",
            base,
            WATCHED_FETCH_LIMIT,
            WATCHED_FIELDS,
            urlencoding::encode(user_id)
        );
        self.fetch_items(&url).await
    }
}
