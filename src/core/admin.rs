use crate::core::router::Notification;
use crate::core::search::Paginated;
use crate::domain::model::{AccountStatus, UserAccount};
use crate::domain::ports::MarketplaceApi;
use crate::utils::error::Result;

pub const ADMIN_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AccountStatus),
}

impl StatusFilter {
    pub fn status(&self) -> Option<AccountStatus> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(*status),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "Todos",
            Self::Only(AccountStatus::Unverified) => "Pendientes",
            Self::Only(AccountStatus::Verified) => "Verificados",
            Self::Only(AccountStatus::Suspended) => "Suspendidos",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: usize,
    pub unverified: usize,
    pub verified: usize,
    pub suspended: usize,
}

/// Admin panel for moderating accounts: loads them by status and moves
/// them between Verified and Suspended.
#[derive(Debug)]
pub struct AccountReview {
    filter: StatusFilter,
    accounts: Paginated<UserAccount>,
    notification: Option<Notification>,
}

impl Default for AccountReview {
    fn default() -> Self {
        Self::new(ADMIN_PAGE_SIZE)
    }
}

impl AccountReview {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: StatusFilter::All,
            accounts: Paginated::new(page_size),
            notification: None,
        }
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn accounts(&self) -> &Paginated<UserAccount> {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut Paginated<UserAccount> {
        &mut self.accounts
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn status_of(&self, person_id: &str) -> Option<AccountStatus> {
        self.accounts
            .items()
            .iter()
            .find(|account| account.id == person_id)
            .map(|account| account.account_status)
    }

    /// Counts over whatever is currently loaded.
    pub fn counts(&self) -> StatusCounts {
        self.accounts
            .items()
            .iter()
            .fold(StatusCounts::default(), |mut counts, account| {
                counts.all += 1;
                match account.account_status {
                    AccountStatus::Unverified => counts.unverified += 1,
                    AccountStatus::Verified => counts.verified += 1,
                    AccountStatus::Suspended => counts.suspended += 1,
                }
                counts
            })
    }

    /// Reloads the accounts matching the active filter. On failure the
    /// previously loaded accounts stay on display.
    pub async fn refresh<A>(&mut self, api: &A) -> Result<usize>
    where
        A: MarketplaceApi + ?Sized,
    {
        match api.fetch_accounts(self.filter.status()).await {
            Ok(accounts) => {
                let count = accounts.len();
                tracing::debug!("Loaded {} accounts for filter {:?}", count, self.filter);
                self.accounts.replace(accounts);
                Ok(count)
            }
            Err(e) => {
                self.notification = Some(Notification::error(e.user_friendly_message()));
                Err(e)
            }
        }
    }

    pub async fn set_filter<A>(&mut self, api: &A, filter: StatusFilter) -> Result<usize>
    where
        A: MarketplaceApi + ?Sized,
    {
        self.filter = filter;
        self.refresh(api).await
    }

    pub async fn approve<A>(&mut self, api: &A, person_id: &str) -> Result<()>
    where
        A: MarketplaceApi + ?Sized,
    {
        self.transition(api, person_id, AccountStatus::Verified, "Cuenta aprobada exitosamente")
            .await
    }

    pub async fn suspend<A>(&mut self, api: &A, person_id: &str) -> Result<()>
    where
        A: MarketplaceApi + ?Sized,
    {
        self.transition(api, person_id, AccountStatus::Suspended, "Cuenta suspendida exitosamente")
            .await
    }

    async fn transition<A>(
        &mut self,
        api: &A,
        person_id: &str,
        status: AccountStatus,
        success_message: &str,
    ) -> Result<()>
    where
        A: MarketplaceApi + ?Sized,
    {
        if let Err(e) = api.update_account_status(person_id, status).await {
            tracing::warn!("Status change of {} to {:?} failed: {}", person_id, status, e);
            self.notification = Some(Notification::error(e.user_friendly_message()));
            return Err(e);
        }

        tracing::info!("Account {} moved to {:?}", person_id, status);
        self.notification = Some(Notification::success(success_message));
        if let Err(e) = self.refresh(api).await {
            tracing::warn!("Reload after status change failed: {}", e);
        }
        Ok(())
    }
}
