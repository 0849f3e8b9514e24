use chrono::NaiveDate;
use serde::Serialize;

/// An upcoming episode of a watchlist show
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarEpisode {
    pub show_id: i64,
    pub show_name: String,
    pub show_poster: Option<String>,
    pub season_number: i64,
    pub episode_number: i64,
    pub name: String,
    pub overview: String,
    pub air_date: NaiveDate,
    pub still_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarResponse {
    pub episodes: Vec<CalendarEpisode>,
    pub shows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CalendarResponse {
    /// Response for a watchlist without any TV shows
    pub fn no_shows() -> Self {
        Self {
            episodes: Vec::new(),
            shows: 0,
            days: None,
            message: Some("No TV shows in your watchlist.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_air_date_serialization() {
        let episode = CalendarEpisode {
            show_id: 1399,
            show_name: "Game of Thrones".to_string(),
            show_poster: None,
            season_number: 8,
            episode_number: 3,
            name: "The Long Night".to_string(),
            overview: String::new(),
            air_date: NaiveDate::from_ymd_opt(2019, 4, 28).unwrap(),
            still_path: None,
        };

        let json = serde_json::to_value(&episode).unwrap();
        assert_eq!(json["air_date"], "2019-04-28");
        assert_eq!(json["season_number"], 8);
    }

    #[test]
    fn test_no_shows_response() {
        let json = serde_json::to_value(CalendarResponse::no_shows()).unwrap();
        assert_eq!(json["shows"], 0);
        assert_eq!(json["message"], "No TV shows in your watchlist.");
        assert!(json.get("days").is_none());
    }
}
