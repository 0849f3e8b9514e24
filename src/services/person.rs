use std::sync::Arc;

use crate::{
    config::StreamingConfig,
    error::AppResult,
    models::{
        CreditAvailability, CreditRef, PersonAvailability, PersonDetails, PersonProfile,
        PersonSummary, RegionOffers,
    },
    services::{
        fetch::FetchCoordinator,
        providers::{MetadataProvider, ProviderError},
    },
};

/// Credits listed on a person's profile
pub const PROFILE_CREDITS: usize = 30;
/// Credits checked for regional availability
pub const AVAILABILITY_CREDITS: usize = 20;

pub struct PersonService {
    provider: Arc<dyn MetadataProvider>,
    config: Arc<StreamingConfig>,
    coordinator: FetchCoordinator,
}

impl PersonService {
    pub fn new(provider: Arc<dyn MetadataProvider>, config: Arc<StreamingConfig>) -> Self {
        let coordinator = FetchCoordinator::new(config.fetch_concurrency);
        Self {
            provider,
            config,
            coordinator,
        }
    }

    async fn details(&self, person_id: i64) -> AppResult<PersonDetails> {
        let raw = self.provider.person(person_id).await?;
        let details = serde_json::from_value(raw).map_err(ProviderError::from)?;
        Ok(details)
    }

    /// Person details with their best-known cast credits
    pub async fn profile(&self, person_id: i64) -> AppResult<PersonProfile> {
        let person = self.details(person_id).await?;
        let filmography = person.top_cast(PROFILE_CREDITS);

        Ok(PersonProfile {
            id: person.id,
            name: person.name,
            biography: person.biography,
            profile_path: person.profile_path,
            birthday: person.birthday,
            place_of_birth: person.place_of_birth,
            known_for_department: person.known_for_department,
            filmography,
        })
    }

    /// Top credits with their offers in the configured region
    ///
    /// A credit whose providers cannot be fetched is reported with no offers.
    pub async fn availability(&self, person_id: i64) -> AppResult<PersonAvailability> {
        let person = self.details(person_id).await?;
        let credits: Vec<CreditRef> = person
            .top_cast(AVAILABILITY_CREDITS)
            .iter()
            .filter_map(CreditRef::from_credit)
            .collect();

        tracing::info!(
            person_id,
            credits = credits.len(),
            region = %self.config.watch_region,
            "Fetching filmography availability"
        );

        let targets: Vec<_> = credits.iter().map(|c| (c.media_type, c.id)).collect();
        let provider = Arc::clone(&self.provider);
        let region = self.config.watch_region.clone();

        let offers = self
            .coordinator
            .fan_out(
                targets,
                |(media_type, id)| {
                    let provider = Arc::clone(&provider);
                    let region = region.clone();
                    async move {
                        let providers = provider.watch_providers(media_type, id).await?;
                        Ok::<_, ProviderError>(providers.region(&region))
                    }
                },
                RegionOffers::default(),
            )
            .await;

        let filmography = credits
            .into_iter()
            .zip(offers)
            .map(|(credit, offers)| CreditAvailability::new(credit, offers))
            .collect();

        Ok(PersonAvailability {
            person: PersonSummary::from(&person),
            filmography,
        })
    }
}
