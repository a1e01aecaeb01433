use crate::models::{LibraryItem, MediaKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub user: JellyfinUser,
    pub access_token: String,
    pub server_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResult {
    #[serde(default)]
    pub items: Vec<BaseItemDto>,
    pub total_record_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItemDto {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub item_type: String,
    pub genres: Option<Vec<String>>,
    pub community_rating: Option<f32>,
    pub production_year: Option<i32>,
    pub premiere_date: Option<String>,
    pub date_created: Option<String>,
    pub user_data: Option<UserItemData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserItemData {
    pub played: Option<bool>,
}

impl BaseItemDto {
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self.item_type.as_str() {
            "Movie" => Some(MediaKind::Movie),
            "Series" => Some(MediaKind::Series),
            _ => None,
        }
    }

    /// Convert into the shared library model.
    ///
    /// Returns `None` for item types the discovery core doesn't handle.
    /// Dates are parsed leniently: a malformed date becomes `None` rather
    /// than failing the whole result page.
    pub fn into_library_item(self, cover_url: Option<String>) -> Option<LibraryItem> {
        let kind = self.media_kind()?;
        Some(LibraryItem {
            kind,
            name: self.name.unwrap_or_default(),
            genres: self.genres.unwrap_or_default(),
            community_rating: self.community_rating,
            production_year: self.production_year,
            premiere_date: parse_server_date(self.premiere_date.as_deref()),
            date_created: parse_server_date(self.date_created.as_deref()),
            played: self
                .user_data
                .and_then(|data| data.played)
                .unwrap_or(false),
            id: self.id,
            cover_url,
        })
    }
}

fn parse_server_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
