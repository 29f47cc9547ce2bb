pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{ApiClient, SampleCatalog};
pub use core::{
    admin::AccountReview,
    registration::{RegistrationWizard, Step, StepOutcome},
    router::{AppState, View},
    search::{apply_filters, SearchResults},
};
pub use utils::error::{MarketError, Result};
