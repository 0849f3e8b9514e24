use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MediaType, RegionOffers};

/// Person details as returned with `combined_credits` appended
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonDetails {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub combined_credits: CombinedCredits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedCredits {
    /// Raw credit objects; movie and TV credits carry different fields
    #[serde(default)]
    pub cast: Vec<Value>,
}

impl PersonDetails {
    /// Cast credits with the most votes first, capped at `limit`
    pub fn top_cast(&self, limit: usize) -> Vec<Value> {
        let mut cast = self.combined_credits.cast.clone();
        cast.sort_by_key(|credit| std::cmp::Reverse(vote_count(credit)));
        cast.truncate(limit);
        cast
    }
}

fn vote_count(credit: &Value) -> i64 {
    credit.get("vote_count").and_then(Value::as_i64).unwrap_or(0)
}

/// Person profile with a filmography of raw credits
#[derive(Debug, Clone, Serialize)]
pub struct PersonProfile {
    pub id: i64,
    pub name: String,
    pub biography: String,
    pub profile_path: Option<String>,
    pub birthday: Option<String>,
    pub place_of_birth: Option<String>,
    pub known_for_department: Option<String>,
    pub filmography: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonSummary {
    pub id: i64,
    pub name: String,
    pub profile_path: Option<String>,
    pub biography: String,
    pub birthday: Option<String>,
    pub place_of_birth: Option<String>,
}

impl From<&PersonDetails> for PersonSummary {
    fn from(person: &PersonDetails) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            profile_path: person.profile_path.clone(),
            biography: person.biography.clone(),
            birthday: person.birthday.clone(),
            place_of_birth: person.place_of_birth.clone(),
        }
    }
}

/// Identity and display fields of one cast credit
#[derive(Debug, Clone, PartialEq)]
pub struct CreditRef {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: String,
    pub character: String,
}

impl CreditRef {
    /// Reads a movie or TV credit; `None` when it has no id or an unknown media type
    pub fn from_credit(credit: &Value) -> Option<Self> {
        let text = |field: &str| credit.get(field).and_then(Value::as_str).filter(|s| !s.is_empty());

        let id = credit.get("id").and_then(Value::as_i64)?;
        let media_type = text("media_type").unwrap_or("movie").parse().ok()?;

        Some(Self {
            id,
            media_type,
            title: text("title").or_else(|| text("name")).unwrap_or_default().to_string(),
            poster_path: text("poster_path").map(str::to_string),
            vote_average: credit
                .get("vote_average")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            release_date: text("release_date")
                .or_else(|| text("first_air_date"))
                .unwrap_or_default()
                .to_string(),
            character: text("character").unwrap_or_default().to_string(),
        })
    }
}

/// A credit with its offers in the configured region
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreditAvailability {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: String,
    pub character: String,
    pub region_providers: RegionOffers,
    /// Whether any platform offers the title at a flat rate
    pub available: bool,
}

impl CreditAvailability {
    pub fn new(credit: CreditRef, offers: RegionOffers) -> Self {
        Self {
            id: credit.id,
            media_type: credit.media_type,
            title: credit.title,
            poster_path: credit.poster_path,
            vote_average: credit.vote_average,
            release_date: credit.release_date,
            character: credit.character,
            available: !offers.flatrate.is_empty(),
            region_providers: offers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonAvailability {
    pub person: PersonSummary,
    pub filmography: Vec<CreditAvailability>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_cast_orders_by_vote_count() {
        let person: PersonDetails = serde_json::from_value(json!({
            "id": 287,
            "name": "Brad Pitt",
            "combined_credits": {
                "cast": [
                    {"id": 1, "vote_count": 10},
                    {"id": 2},
                    {"id": 3, "vote_count": 300},
                    {"id": 4, "vote_count": 50}
                ]
            }
        }))
        .unwrap();

        let ids: Vec<i64> = person
            .top_cast(3)
            .iter()
            .filter_map(|c| c["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![3, 4, 1]);
        assert_eq!(person.biography, "");
    }

    #[test]
    fn test_credit_ref_reads_tv_fields() {
        let credit = CreditRef::from_credit(&json!({
            "id": 1399,
            "media_type": "tv",
            "name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "vote_average": 8.4
        }))
        .unwrap();

        assert_eq!(credit.media_type, MediaType::Tv);
        assert_eq!(credit.title, "Game of Thrones");
        assert_eq!(credit.release_date, "2011-04-17");
        assert_eq!(credit.character, "");
    }

    #[test]
    fn test_credit_ref_defaults_to_movie() {
        let credit = CreditRef::from_credit(&json!({"id": 550, "title": "Fight Club"})).unwrap();
        assert_eq!(credit.media_type, MediaType::Movie);

        assert!(CreditRef::from_credit(&json!({"title": "No id"})).is_none());
        assert!(CreditRef::from_credit(&json!({"id": 1, "media_type": "person"})).is_none());
    }
}
