pub mod calendar;
pub mod optimization;
pub mod person;
pub mod tmdb;
pub mod watchlist;

pub use calendar::{CalendarEpisode, CalendarResponse};
pub use optimization::{
    OptimizationResponse, Platform, PlatformCombination, RegionProvider, TitleProviders,
};
pub use person::{
    CreditAvailability, CreditRef, PersonAvailability, PersonDetails, PersonProfile, PersonSummary,
};
pub use tmdb::{
    EpisodePointer, ProviderListing, ProviderOffer, RegionOffers, SearchKind, SearchPage,
    SeasonDetails, SeasonEpisode, SeasonSummary, TvBasic, WatchProviders,
};
pub use watchlist::{AddWatchlistRequest, MediaType, NewWatchlistItem, WatchlistItem};
