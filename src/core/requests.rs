use crate::domain::model::{
    is_known_category, CreatedServiceRequest, NewServiceRequest, PriceRange, RequestStatus,
    ServiceRequestRecord,
};
use crate::domain::ports::MarketplaceApi;
use crate::utils::error::{MarketError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardFilter {
    #[default]
    Todas,
    Only(RequestStatus),
}

impl BoardFilter {
    pub fn matches(&self, record: &ServiceRequestRecord) -> bool {
        match self {
            Self::Todas => true,
            Self::Only(status) => record.status == *status,
        }
    }
}

/// The requester dashboard's list of their own requests.
#[derive(Debug, Default)]
pub struct RequestBoard {
    records: Vec<ServiceRequestRecord>,
    filter: BoardFilter,
}

impl RequestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ServiceRequestRecord>) -> Self {
        Self {
            records,
            filter: BoardFilter::Todas,
        }
    }

    pub fn filter(&self) -> BoardFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: BoardFilter) {
        self.filter = filter;
    }

    pub fn visible(&self) -> Vec<&ServiceRequestRecord> {
        self.records
            .iter()
            .filter(|record| self.filter.matches(record))
            .collect()
    }

    pub fn count(&self, status: RequestStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub async fn load<A>(&mut self, api: &A, requester_id: &str) -> Result<usize>
    where
        A: MarketplaceApi + ?Sized,
    {
        let records = api.fetch_service_requests(requester_id).await?;
        self.records = records;
        Ok(self.records.len())
    }
}

/// Fields of the "new request" form before they become a wire DTO.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    pub provider_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_min: u64,
    pub price_max: u64,
}

impl RequestDraft {
    pub fn into_request(self) -> Result<NewServiceRequest> {
        if self.provider_id.trim().is_empty() {
            return Err(MarketError::validation("prestadorId", "El prestador es requerido"));
        }
        if self.title.trim().is_empty() {
            return Err(MarketError::validation("titulo", "El título es requerido"));
        }
        if self.description.trim().is_empty() {
            return Err(MarketError::validation("descripcion", "La descripción es requerida"));
        }
        if !is_known_category(&self.category) {
            return Err(MarketError::validation(
                "categoria",
                format!("Categoría desconocida: {}", self.category),
            ));
        }
        let range = PriceRange::new(self.price_min, self.price_max)?;

        Ok(NewServiceRequest {
            provider_id: self.provider_id.trim().to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category,
            price_min: range.min(),
            price_max: range.max(),
        })
    }
}

/// Validates locally, then posts. Nothing is sent when validation fails.
pub async fn submit_request<A>(api: &A, draft: RequestDraft) -> Result<CreatedServiceRequest>
where
    A: MarketplaceApi + ?Sized,
{
    let request = draft.into_request()?;
    let created = api.create_service_request(&request).await?;
    tracing::info!("Created service request {} ({})", created.id, created.title);
    Ok(created)
}
