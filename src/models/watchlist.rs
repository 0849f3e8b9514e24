use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Kind of title tracked by the metadata provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(AppError::InvalidInput(format!(
                "Invalid media type: {}",
                other
            ))),
        }
    }
}

/// A title saved to the user's watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistItem {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WatchlistItem {
    /// Key used to index the title in optimizer results, e.g. `tv_1399`
    pub fn key(&self) -> String {
        format!("{}_{}", self.media_type, self.id)
    }

    /// Display title, falling back to "Unknown" when the stored title is blank
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Unknown"
        } else {
            &self.title
        }
    }
}

/// A title to insert into the watchlist; `added_at` is assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatchlistItem {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: Option<String>,
}

impl NewWatchlistItem {
    pub fn into_item(self, added_at: DateTime<Utc>) -> WatchlistItem {
        WatchlistItem {
            id: self.id,
            media_type: self.media_type,
            title: self.title,
            poster_path: self.poster_path,
            vote_average: self.vote_average,
            release_date: self.release_date,
            added_at,
        }
    }
}

/// Raw request body for adding a title; the media type is validated on conversion
#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub id: i64,
    pub media_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl TryFrom<AddWatchlistRequest> for NewWatchlistItem {
    type Error = AppError;

    fn try_from(request: AddWatchlistRequest) -> Result<Self, Self::Error> {
        Ok(NewWatchlistItem {
            id: request.id,
            media_type: request.media_type.parse()?,
            title: request.title.unwrap_or_default(),
            poster_path: request.poster_path.filter(|p| !p.is_empty()),
            vote_average: request.vote_average.unwrap_or(0.0),
            release_date: request.release_date.filter(|d| !d.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parse() {
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("tv".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert!(matches!(
            "person".parse::<MediaType>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_media_type_serde() {
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");
        let parsed: MediaType = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(parsed, MediaType::Movie);
    }

    #[test]
    fn test_item_key_and_display_title() {
        let item = NewWatchlistItem {
            id: 1399,
            media_type: MediaType::Tv,
            title: "  ".to_string(),
            poster_path: None,
            vote_average: 8.4,
            release_date: None,
        }
        .into_item(Utc::now());

        assert_eq!(item.key(), "tv_1399");
        assert_eq!(item.display_title(), "Unknown");
    }

    #[test]
    fn test_add_request_conversion() {
        let request: AddWatchlistRequest = serde_json::from_str(
            r#"{"id": 603, "media_type": "movie", "title": "The Matrix", "poster_path": ""}"#,
        )
        .unwrap();

        let item = NewWatchlistItem::try_from(request).unwrap();
        assert_eq!(item.media_type, MediaType::Movie);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.poster_path, None);
        assert_eq!(item.vote_average, 0.0);
    }

    #[test]
    fn test_add_request_rejects_unknown_media_type() {
        let request: AddWatchlistRequest =
            serde_json::from_str(r#"{"id": 1, "media_type": "podcast"}"#).unwrap();
        assert!(NewWatchlistItem::try_from(request).is_err());
    }
}
