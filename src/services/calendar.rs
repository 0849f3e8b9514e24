use std::{collections::BTreeSet, sync::Arc};

use chrono::{Duration, NaiveDate};

use crate::{
    config::StreamingConfig,
    error::AppResult,
    models::{CalendarEpisode, CalendarResponse, MediaType, TvBasic, WatchlistItem},
    services::{
        fetch::{FetchCoordinator, FetchFailure, FetchOutcome},
        providers::{MetadataProvider, ProviderResult},
    },
};

/// Watchlist show fields carried into each show's lookup task
#[derive(Debug, Clone)]
struct ShowTarget {
    id: i64,
    title: String,
    poster_path: Option<String>,
}

/// Inclusive date range episodes must air within
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AirWindow {
    pub fn starting(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today,
            end: today + Duration::days(days),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Seasons worth checking for upcoming episodes, ascending
///
/// The next-episode season plus the last two real seasons; specials (season 0) are ignored.
pub fn candidate_seasons(show: &TvBasic) -> BTreeSet<i64> {
    let mut seasons = BTreeSet::new();

    if let Some(season) = show
        .next_episode_to_air
        .as_ref()
        .and_then(|next| next.season_number)
        .filter(|&n| n > 0)
    {
        seasons.insert(season);
    }

    let real: Vec<i64> = show
        .seasons
        .iter()
        .map(|s| s.season_number)
        .filter(|&n| n > 0)
        .collect();
    seasons.extend(real.iter().rev().take(2));

    seasons
}

/// Collects upcoming episodes for the TV shows in a watchlist
pub struct CalendarService {
    provider: Arc<dyn MetadataProvider>,
    config: Arc<StreamingConfig>,
    coordinator: FetchCoordinator,
}

impl CalendarService {
    pub fn new(provider: Arc<dyn MetadataProvider>, config: Arc<StreamingConfig>) -> Self {
        let coordinator = FetchCoordinator::new(config.fetch_concurrency);
        Self {
            provider,
            config,
            coordinator,
        }
    }

    /// Episodes airing between `today` and `today + calendar_days`, sorted by air date
    pub async fn upcoming(
        &self,
        watchlist: &[WatchlistItem],
        today: NaiveDate,
    ) -> AppResult<CalendarResponse> {
        let shows: Vec<ShowTarget> = watchlist
            .iter()
            .filter(|item| item.media_type == MediaType::Tv)
            .map(|item| ShowTarget {
                id: item.id,
                title: item.title.clone(),
                poster_path: item.poster_path.clone(),
            })
            .collect();

        if shows.is_empty() {
            return Ok(CalendarResponse::no_shows());
        }

        let show_count = shows.len();
        let window = AirWindow::starting(today, self.config.calendar_days);

        tracing::info!(
            shows = show_count,
            from = %window.start,
            to = %window.end,
            "Fetching upcoming episodes"
        );

        let provider = Arc::clone(&self.provider);
        let outcomes = self
            .coordinator
            .run(shows, |show| {
                let provider = Arc::clone(&provider);
                async move { show_episodes(provider, show, window).await }
            })
            .await;

        let mut episodes: Vec<CalendarEpisode> = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                FetchOutcome::Fetched(found) => episodes.extend(found),
                FetchOutcome::Failed(FetchFailure::Lookup(e)) if e.is_auth_failure() => {
                    tracing::error!(index, error = %e, "Metadata provider rejected credentials");
                    return Err(e.into());
                }
                FetchOutcome::Failed(failure) => {
                    tracing::warn!(index, error = %failure, "Episode fetch failed for show");
                }
            }
        }

        // Stable, so same-day episodes keep show and season order
        episodes.sort_by_key(|e| e.air_date);

        tracing::info!(episodes = episodes.len(), "Calendar built");

        Ok(CalendarResponse {
            episodes,
            shows: show_count,
            days: Some(self.config.calendar_days),
            message: None,
        })
    }
}

/// Upcoming episodes of a single show
///
/// A failed season fetch skips that season unless the provider rejected our
/// credentials; a failed show lookup fails the whole show.
async fn show_episodes(
    provider: Arc<dyn MetadataProvider>,
    show: ShowTarget,
    window: AirWindow,
) -> ProviderResult<Vec<CalendarEpisode>> {
    let details = provider.tv_basic(show.id).await?;

    if details.is_finished() {
        tracing::debug!(show_id = show.id, status = ?details.status, "Skipping finished show");
        return Ok(Vec::new());
    }

    let show_name = details
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| Some(show.title.clone()).filter(|title| !title.trim().is_empty()))
        .unwrap_or_else(|| "Unknown".to_string());
    let show_poster = details.poster_path.clone().or(show.poster_path);

    let mut episodes = Vec::new();

    for season_number in candidate_seasons(&details) {
        let season = match provider.season(show.id, season_number).await {
            Ok(season) => season,
            Err(e) if e.is_auth_failure() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    show_id = show.id,
                    season = season_number,
                    error = %e,
                    "Season fetch failed, skipping"
                );
                continue;
            }
        };

        for episode in season.episodes {
            let Some(air_date) = episode
                .air_date
                .as_deref()
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            else {
                continue;
            };

            if !window.contains(air_date) {
                continue;
            }

            episodes.push(CalendarEpisode {
                show_id: show.id,
                show_name: show_name.clone(),
                show_poster: show_poster.clone(),
                season_number: episode.season_number.unwrap_or(season_number),
                episode_number: episode.episode_number.unwrap_or(0),
                name: episode.name.unwrap_or_default(),
                overview: episode.overview.unwrap_or_default(),
                air_date,
                still_path: episode.still_path,
            });
        }
    }

    Ok(episodes)
}
