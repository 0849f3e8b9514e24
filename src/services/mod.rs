pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod fetch;
pub mod optimization;
pub mod optimizer;
pub mod person;
pub mod providers;

pub use availability::{AvailabilityService, ProviderCatalogue};
pub use calendar::CalendarService;
pub use catalog::CatalogService;
pub use fetch::{FetchCoordinator, FetchFailure, FetchOutcome};
pub use optimizer::{Optimizer, OptimizerError};
pub use person::PersonService;
