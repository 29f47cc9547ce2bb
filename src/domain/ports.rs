use crate::domain::model::{
    AccountStatus, CreatedServiceRequest, RegistrationDraft, ServiceListing, ServiceRequestRecord,
    NewServiceRequest, UserAccount,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Entry point the registration wizard hands a finished draft to.
#[async_trait]
pub trait RegistrationSubmitter: Send + Sync {
    async fn register(&self, draft: &RegistrationDraft) -> Result<UserAccount>;
}

/// The remote marketplace API. Every failure comes back as an already
/// normalized `MarketError::ApiError`.
#[async_trait]
pub trait MarketplaceApi: RegistrationSubmitter {
    /// Authenticates and keeps the bearer token for subsequent calls.
    async fn login(&self, email: &str, password: &str) -> Result<UserAccount>;

    async fn logout(&self);

    async fn fetch_accounts(&self, status: Option<AccountStatus>) -> Result<Vec<UserAccount>>;

    async fn update_account_status(&self, person_id: &str, status: AccountStatus) -> Result<()>;

    async fn create_service_request(
        &self,
        request: &NewServiceRequest,
    ) -> Result<CreatedServiceRequest>;

    async fn fetch_service_requests(&self, requester_id: &str) -> Result<Vec<ServiceRequestRecord>>;
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<ServiceListing>>;
}
