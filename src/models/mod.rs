use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a title is a movie or a series.
///
/// Both the local library and the remote catalog carry this distinction;
/// matching never crosses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "series" => Ok(MediaKind::Series),
            _ => Err(format!("Invalid media kind: {}", s)),
        }
    }
}

/// A movie or series entry in the user's local media collection.
///
/// Read-only from the discovery core's perspective; produced by a
/// `LibraryProvider` implementation from the media server's item DTOs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub kind: MediaKind,
    pub genres: Vec<String>,
    pub community_rating: Option<f32>,
    pub production_year: Option<i32>,
    /// Original release date, when the server knows it.
    pub premiere_date: Option<DateTime<Utc>>,
    /// When the item was added to the library.
    pub date_created: Option<DateTime<Utc>>,
    pub played: bool,
    #[serde(rename = "cover_image")]
    pub cover_url: Option<String>,
}

impl LibraryItem {
    /// The date used for recency filtering and sorting: the premiere date
    /// when available, otherwise the date the item entered the library.
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        self.premiere_date.or(self.date_created)
    }
}

/// Where a remote candidate came from within the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    New,
    Popular,
}

/// A title/year/score record sourced from the remote metadata provider,
/// not yet tied to a local library item.
///
/// The title is always non-empty; records with no derivable title are
/// dropped during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub year: Option<i32>,
    pub score: Option<f64>,
    pub kind: MediaKind,
    pub source: CandidateKind,
}

impl Candidate {
    /// Composite dedup key: kind, lowercased title, year.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.kind.as_str(),
            self.title.to_lowercase(),
            self.year.map(|y| y.to_string()).unwrap_or_default()
        )
    }
}

/// The aggregated output of one candidate fetch: the "new" and "popular"
/// categories, each already deduplicated and truncated.
///
/// Replaced atomically in the fetcher's cache; never partially updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSet {
    pub new_titles: Vec<Candidate>,
    pub popular_titles: Vec<Candidate>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.new_titles.is_empty() && self.popular_titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_round_trip() {
        assert_eq!("movie".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert_eq!("Series".parse::<MediaKind>().unwrap(), MediaKind::Series);
        assert!("episode".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_dedup_key_ignores_title_case() {
        let a = Candidate {
            title: "Dune".into(),
            year: Some(2021),
            score: None,
            kind: MediaKind::Movie,
            source: CandidateKind::New,
        };
        let b = Candidate {
            title: "DUNE".into(),
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_reference_date_prefers_premiere() {
        let premiere = Utc::now();
        let created = premiere - chrono::TimeDelta::days(30);
        let item = LibraryItem {
            id: "1".into(),
            name: "Dune".into(),
            kind: MediaKind::Movie,
            genres: vec![],
            community_rating: None,
            production_year: Some(2021),
            premiere_date: Some(premiere),
            date_created: Some(created),
            played: false,
            cover_url: None,
        };
        assert_eq!(item.reference_date(), Some(premiere));
    }

    #[test]
    fn test_library_item_serializes_with_dates() {
        let item = LibraryItem {
            id: "1".into(),
            name: "Dune".into(),
            kind: MediaKind::Movie,
            genres: vec!["Science Fiction".into()],
            community_rating: Some(8.1),
            production_year: Some(2021),
            premiere_date: Some(Utc::now()),
            date_created: None,
            played: false,
            cover_url: Some("https://media.example.com/cover.jpg".into()),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "movie");
        assert_eq!(json["cover_image"], "https://media.example.com/cover.jpg");
        assert!(json["premiere_date"].is_string());

        let back: LibraryItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.premiere_date, item.premiere_date);
    }
}
