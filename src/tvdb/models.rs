//! Wire DTOs for the TVDB v4 API.
//!
//! The filter endpoints are loose about shape: `data` is either a bare
//! array of records or an object with an `items` array, and `year` arrives
//! as either a string or a number depending on the endpoint. The types
//! here absorb both without failing the whole response.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub data: Option<AuthData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub data: Option<RecordData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordData {
    List(Vec<BaseRecord>),
    Paged { items: Option<Vec<BaseRecord>> },
}

impl ApiResponse {
    /// Flatten the two response shapes into a plain record list.
    pub fn into_records(self) -> Vec<BaseRecord> {
        match self.data {
            Some(RecordData::List(records)) => records,
            Some(RecordData::Paged { items }) => items.unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseRecord {
    pub name: Option<String>,
    pub title: Option<String>,
    pub year: Option<YearField>,
    pub score: Option<f64>,
}

impl BaseRecord {
    /// First non-empty of `name`/`title`, trimmed. `None` means the record
    /// carries no usable title and is dropped.
    pub fn display_title(&self) -> Option<String> {
        for raw in [self.name.as_deref(), self.title.as_deref()] {
            if let Some(raw) = raw {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// Lenient year parse: an unparseable year is `None`, never an error.
    pub fn parsed_year(&self) -> Option<i32> {
        self.year.as_ref().and_then(YearField::parse)
    }
}

/// `year` as TVDB sends it: sometimes `"2024"`, sometimes `2024`, and
/// occasionally something else entirely. The catch-all variant keeps an
/// odd year shape from failing the record (and with it the whole page);
/// it just parses to `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearField {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl YearField {
    pub fn parse(&self) -> Option<i32> {
        match self {
            YearField::Int(n) => i32::try_from(*n).ok(),
            YearField::Float(f) => {
                let truncated = f.trunc();
                (f.is_finite()
                    && truncated >= f64::from(i32::MIN)
                    && truncated <= f64::from(i32::MAX))
                .then(|| truncated as i32)
            }
            YearField::Text(s) => leading_integer(s),
            YearField::Other(_) => None,
        }
    }
}

/// Integer prefix of a string, so `"2021-05"` yields 2021.
fn leading_integer(s: &str) -> Option<i32> {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    format!("{}{}", sign, &digits[..end]).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_from_bare_array() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"data": [{"name": "Dune", "year": "2021"}]}"#).unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_title().as_deref(), Some("Dune"));
        assert_eq!(records[0].parsed_year(), Some(2021));
    }

    #[test]
    fn test_records_from_items_object() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"data": {"items": [{"title": "Severance", "year": 2022}]}}"#)
                .unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_title().as_deref(), Some("Severance"));
        assert_eq!(records[0].parsed_year(), Some(2022));
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: ApiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_records().is_empty());
    }

    #[test]
    fn test_name_preferred_over_title() {
        let record: BaseRecord =
            serde_json::from_str(r#"{"name": "Dune", "title": "Dune: Part One"}"#).unwrap();
        assert_eq!(record.display_title().as_deref(), Some("Dune"));
    }

    #[test]
    fn test_blank_name_falls_back_to_title() {
        let record: BaseRecord =
            serde_json::from_str(r#"{"name": "  ", "title": "Dune"}"#).unwrap();
        assert_eq!(record.display_title().as_deref(), Some("Dune"));
    }

    #[test]
    fn test_unparseable_year_is_none() {
        let record: BaseRecord =
            serde_json::from_str(r#"{"name": "Dune", "year": "unknown"}"#).unwrap();
        assert_eq!(record.parsed_year(), None);
    }

    #[test]
    fn test_fractional_year_does_not_fail_the_page() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"data": [{"name": "Dune", "year": 2021.5}, {"name": "Severance", "year": "2022"}]}"#,
        )
        .unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parsed_year(), Some(2021));
        assert_eq!(records[1].parsed_year(), Some(2022));
    }

    #[test]
    fn test_year_string_takes_integer_prefix() {
        let record: BaseRecord =
            serde_json::from_str(r#"{"name": "Dune", "year": "2021-05"}"#).unwrap();
        assert_eq!(record.parsed_year(), Some(2021));
    }

    #[test]
    fn test_structured_year_is_none_not_an_error() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"data": [{"name": "Dune", "year": {"value": 2021}}]}"#,
        )
        .unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parsed_year(), None);
    }
}
