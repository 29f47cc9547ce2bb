pub mod admin;
pub mod registration;
pub mod requests;
pub mod router;
pub mod search;

pub use crate::domain::model::{
    AccountStatus, RegistrationDraft, Role, SearchFilterSpec, ServiceListing, SortKey, UserAccount,
};
pub use crate::domain::ports::{ListingSource, MarketplaceApi, RegistrationSubmitter};
pub use crate::utils::error::Result;
