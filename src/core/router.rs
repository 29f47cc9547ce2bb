use crate::core::registration::{RegistrationWizard, StepOutcome};
use crate::domain::model::{AccountStatus, Role, UserAccount};
use crate::domain::ports::{MarketplaceApi, RegistrationSubmitter};
use crate::utils::error::{MarketError, Result};
use std::time::{Duration, Instant};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    PendingVerification,
    RequesterDashboard,
    ProviderDashboard,
    SearchResults,
    AdminDashboard,
}

impl View {
    /// Dashboards and search results only open with a live session.
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Self::RequesterDashboard
                | Self::ProviderDashboard
                | Self::SearchResults
                | Self::AdminDashboard
        )
    }

    pub fn dashboard_for(role: Role) -> View {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Requester => Self::RequesterDashboard,
            Role::Provider => Self::ProviderDashboard,
        }
    }

    /// Where a fresh login lands. Only admins go straight to their
    /// dashboard; everyone else reaches theirs through "go to dashboard".
    pub fn after_login(user: &UserAccount) -> View {
        if user.account_status == AccountStatus::Unverified {
            Self::PendingVerification
        } else if user.role == Role::Admin {
            Self::AdminDashboard
        } else {
            Self::Home
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    raised_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTIFICATION_TTL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: UserAccount,
}

impl Session {
    pub fn new(user: UserAccount) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &UserAccount {
        &self.user
    }
}

/// Application-wide UI state: the active view, the session and the last
/// notification. The session is only ever replaced as a whole.
#[derive(Debug)]
pub struct AppState {
    view: View,
    session: Option<Session>,
    notification: Option<Notification>,
    loading: bool,
    registration: Option<RegistrationWizard>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::Home,
            session: None,
            notification: None,
            loading: false,
            registration: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// The notification still worth showing at `now`.
    pub fn active_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn registration(&self) -> Option<&RegistrationWizard> {
        self.registration.as_ref()
    }

    pub fn registration_mut(&mut self) -> Option<&mut RegistrationWizard> {
        self.registration.as_mut()
    }

    fn set_view(&mut self, view: View) {
        if view != View::Register {
            self.registration = None;
        }
        tracing::debug!("view {:?} -> {:?}", self.view, view);
        self.view = view;
    }

    /// Opens `view`, refusing session-gated views while logged out. The
    /// current view is left untouched on refusal.
    pub fn navigate(&mut self, view: View) -> Result<()> {
        if view.requires_session() && self.session.is_none() {
            tracing::warn!("Refusing to open {:?} without a session", view);
            return Err(MarketError::precondition(format!(
                "{:?} requires an authenticated session",
                view
            )));
        }
        if view == View::Register && self.view != View::Register {
            self.registration = Some(RegistrationWizard::new());
        }
        self.set_view(view);
        Ok(())
    }

    pub fn go_to_login(&mut self) {
        self.set_view(View::Login);
    }

    pub fn go_to_register(&mut self) {
        self.registration = Some(RegistrationWizard::new());
        self.view = View::Register;
    }

    pub fn back_to_home(&mut self) {
        self.set_view(View::Home);
    }

    pub fn go_to_search(&mut self) -> Result<()> {
        self.navigate(View::SearchResults)
    }

    pub fn go_to_dashboard(&mut self) -> Result<()> {
        let role = self
            .session
            .as_ref()
            .map(|s| s.user.role)
            .ok_or_else(|| MarketError::precondition("dashboard requires an authenticated session"))?;
        self.navigate(View::dashboard_for(role))
    }

    /// Installs the session of a freshly logged-in user and routes them.
    pub fn apply_login(&mut self, user: UserAccount) {
        let view = View::after_login(&user);
        let notification = if view == View::PendingVerification {
            Notification::error("Tu cuenta está pendiente de verificación")
        } else {
            Notification::success(format!("¡Bienvenido de nuevo, {}!", user.display_name()))
        };
        self.session = Some(Session::new(user));
        self.set_view(view);
        self.notify(notification);
    }

    pub fn apply_registration(&mut self, user: UserAccount) {
        self.session = Some(Session::new(user));
        self.set_view(View::PendingVerification);
        self.notify(Notification::success(
            "¡Registro exitoso! Tu cuenta está en proceso de verificación",
        ));
    }

    /// Returns whether the login succeeded. Failures only raise a
    /// notification and leave the view as it was.
    pub async fn login<A>(&mut self, api: &A, email: &str, password: &str) -> bool
    where
        A: MarketplaceApi + ?Sized,
    {
        self.loading = true;
        let result = api.login(email, password).await;
        self.loading = false;

        match result {
            Ok(user) => {
                self.apply_login(user);
                true
            }
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.notify(Notification::error(e.user_friendly_message()));
                false
            }
        }
    }

    /// Runs `next` on the registration wizard. Only fails when the
    /// register view is not open.
    pub async fn advance_registration<S>(&mut self, submitter: &S) -> Result<StepOutcome>
    where
        S: RegistrationSubmitter + ?Sized,
    {
        let wizard = self
            .registration
            .as_mut()
            .ok_or_else(|| MarketError::precondition("registration view is not open"))?;

        self.loading = true;
        let outcome = wizard.next(submitter).await;
        self.loading = false;

        match &outcome {
            StepOutcome::Submitted(user) => self.apply_registration(user.clone()),
            StepOutcome::Failed(e) => self.notify(Notification::error(e.user_friendly_message())),
            _ => {}
        }
        Ok(outcome)
    }

    pub fn retreat_registration(&mut self) -> Result<()> {
        let wizard = self
            .registration
            .as_mut()
            .ok_or_else(|| MarketError::precondition("registration view is not open"))?;
        wizard.previous();
        Ok(())
    }

    pub async fn logout<A>(&mut self, api: &A)
    where
        A: MarketplaceApi + ?Sized,
    {
        api.logout().await;
        self.session = None;
        self.set_view(View::Home);
        self.notify(Notification::success("Sesión cerrada correctamente"));
    }
}
