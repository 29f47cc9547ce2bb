use crate::config::toml_config::ApiConfig;
use crate::domain::model::{
    AccountStatus, CreatedServiceRequest, Credentials, LoginResponse, NewServiceRequest,
    RegistrationDraft, ServiceListing, ServiceRequestRecord, UserAccount,
};
use crate::domain::ports::{ListingSource, MarketplaceApi, RegistrationSubmitter};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

const REGISTER_PATH: &str = "auth/register";
const LOGIN_PATH: &str = "auth/login";
const PERSON_PATH: &str = "api/Person";
const SERVICE_REQUEST_PATH: &str = "api/ServiceRequest";
const SERVICE_LISTING_PATH: &str = "api/ServiceListing";

#[derive(Serialize)]
struct StatusUpdate {
    #[serde(rename = "accountStatus")]
    account_status: AccountStatus,
}

/// Pulls the human-readable message out of an error body: `message` first,
/// then `error`.
pub fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .find(|message| !message.trim().is_empty())
        .map(str::to_string)
}

/// HTTP gateway to the marketplace backend. The bearer token obtained on
/// login is attached to every later request until logout.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        validate_url("api.base_url", base_url)?;
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `path` followed by `segment` as one escaped path segment, so ids
    /// containing `/` or `?` cannot change the route.
    fn url_with_segment(&self, path: &str, segment: &str) -> Result<String> {
        let mut url =
            Url::parse(&self.url(path)).map_err(|e| MarketError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: self.base_url.clone(),
                reason: e.to_string(),
            })?;
        url.path_segments_mut()
            .map_err(|_| MarketError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: self.base_url.clone(),
                reason: "URL cannot carry path segments".to_string(),
            })?
            .push(segment);
        Ok(url.into())
    }

    async fn execute(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        let request = match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request failed before a response arrived: {}", e);
                return Err(MarketError::api(None, fallback));
            }
        };

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
        let message = extract_error_message(&body).unwrap_or_else(|| fallback.to_string());
        tracing::warn!("API call rejected with {}: {}", status, message);
        Err(MarketError::api(Some(status.as_u16()), message))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = self.execute(request, fallback).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Could not decode API response: {}", e);
            MarketError::api(Some(status), fallback)
        })
    }
}

#[async_trait]
impl RegistrationSubmitter for ApiClient {
    async fn register(&self, draft: &RegistrationDraft) -> Result<UserAccount> {
        tracing::debug!("Making API request to: {}", self.url(REGISTER_PATH));
        let request = self.client.post(self.url(REGISTER_PATH)).json(draft);
        self.fetch_json(request, "Error al registrar usuario").await
    }
}

#[async_trait]
impl MarketplaceApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<UserAccount> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.url(LOGIN_PATH)).json(&credentials);
        let LoginResponse { token, user } =
            self.fetch_json(request, "Error al iniciar sesión").await?;

        if let Some(token) = token {
            *self.token.write().await = Some(token);
        }
        tracing::info!("Logged in as {} ({})", user.email, user.role.label());
        Ok(user)
    }

    async fn logout(&self) {
        *self.token.write().await = None;
    }

    async fn fetch_accounts(&self, status: Option<AccountStatus>) -> Result<Vec<UserAccount>> {
        let mut request = self.client.get(self.url(PERSON_PATH));
        if let Some(status) = status {
            request = request.query(&[("accountStatus", status.code())]);
        }
        self.fetch_json(request, "Error al obtener usuarios").await
    }

    async fn update_account_status(&self, person_id: &str, status: AccountStatus) -> Result<()> {
        let url = self.url_with_segment(PERSON_PATH, person_id)?;
        let request = self.client.patch(url).json(&StatusUpdate {
            account_status: status,
        });
        self.execute(request, "Error al actualizar estado de cuenta")
            .await?;
        Ok(())
    }

    async fn create_service_request(
        &self,
        request: &NewServiceRequest,
    ) -> Result<CreatedServiceRequest> {
        let builder = self.client.post(self.url(SERVICE_REQUEST_PATH)).json(request);
        self.fetch_json(builder, "Error al crear la solicitud de servicio.")
            .await
    }

    async fn fetch_service_requests(&self, requester_id: &str) -> Result<Vec<ServiceRequestRecord>> {
        let request = self
            .client
            .get(self.url(SERVICE_REQUEST_PATH))
            .query(&[("requesterId", requester_id)]);
        self.fetch_json(request, "Error al cargar solicitudes").await
    }
}

#[async_trait]
impl ListingSource for ApiClient {
    async fn fetch_listings(&self) -> Result<Vec<ServiceListing>> {
        let request = self.client.get(self.url(SERVICE_LISTING_PATH));
        self.fetch_json(request, "Error al cargar servicios").await
    }
}
