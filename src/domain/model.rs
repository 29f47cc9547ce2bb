use crate::utils::error::{MarketError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Account role, decoded once from the backend's numeric string codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "0")]
    Admin,
    #[serde(rename = "1")]
    Requester,
    #[serde(rename = "2")]
    Provider,
}

impl Role {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Admin => "0",
            Self::Requester => "1",
            Self::Provider => "2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrador",
            Self::Requester => "Solicitante",
            Self::Provider => "Prestador",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "U")]
    Unverified,
    #[serde(rename = "V")]
    Verified,
    #[serde(rename = "S")]
    Suspended,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 3] = [Self::Unverified, Self::Verified, Self::Suspended];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unverified => "U",
            Self::Verified => "V",
            Self::Suspended => "S",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unverified => "Pendiente",
            Self::Verified => "Verificado",
            Self::Suspended => "Suspendido",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "U" | "u" | "unverified" => Ok(Self::Unverified),
            "V" | "v" | "verified" => Ok(Self::Verified),
            "S" | "s" | "suspended" => Ok(Self::Suspended),
            other => Err(MarketError::validation(
                "accountStatus",
                format!("Estado de cuenta desconocido: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "persona_id")]
    pub id: String,
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos", default)]
    pub last_names: String,
    #[serde(rename = "tipo_identificacion", default)]
    pub document_type: String,
    #[serde(rename = "numero_identificacion", default)]
    pub document_number: String,
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "fecha_nacimiento", default)]
    pub birth_date: String,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "estado_cuenta")]
    pub account_status: AccountStatus,
    #[serde(rename = "direccion", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "ciudad", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "departamento", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(rename = "codigo_postal", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(rename = "aceptar_terminos", default)]
    pub accepted_terms: bool,
    #[serde(rename = "aceptar_datos", default)]
    pub accepted_data_treatment: bool,
    #[serde(rename = "recibir_notificaciones", default)]
    pub receives_notifications: bool,
}

impl UserAccount {
    pub fn display_name(&self) -> &str {
        &self.first_names
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserAccount,
}

pub const MAX_DOCUMENT_BYTES: u64 = 5 * 1024 * 1024;

/// Reference to a file picked for upload; the bytes stay with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSlot {
    Front,
    Back,
    Selfie,
}

impl DocumentSlot {
    pub fn accepted_types(&self) -> &'static [&'static str] {
        match self {
            Self::Front | Self::Back => &["image/jpeg", "image/png", "application/pdf"],
            Self::Selfie => &["image/jpeg", "image/png"],
        }
    }

    pub fn check(&self, file: &DocumentFile) -> Result<()> {
        let field = match self {
            Self::Front => "documentFront",
            Self::Back => "documentBack",
            Self::Selfie => "selfieWithDocument",
        };
        if !self.accepted_types().contains(&file.content_type.as_str()) {
            return Err(MarketError::validation(
                field,
                format!("Formato no permitido: {}", file.content_type),
            ));
        }
        if file.size_bytes > MAX_DOCUMENT_BYTES {
            return Err(MarketError::validation(
                field,
                "El archivo supera el tamaño máximo de 5MB",
            ));
        }
        Ok(())
    }
}

/// Everything the registration wizard collects before submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub gender: String,

    pub document_type: String,
    pub document_number: String,
    pub document_expedition: String,
    pub document_place: String,

    pub document_front: Option<DocumentFile>,
    pub document_back: Option<DocumentFile>,
    pub selfie_with_document: Option<DocumentFile>,

    pub address: String,
    pub city: String,
    pub department: String,
    pub postal_code: Option<String>,

    pub password: String,
    pub confirm_password: String,
    pub security_question: String,
    pub security_answer: String,

    pub accept_terms: bool,
    pub accept_data_treatment: bool,
    pub receive_notifications: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCategory {
    pub id: &'static str,
    pub label: &'static str,
}

pub const SERVICE_CATEGORIES: [ServiceCategory; 5] = [
    ServiceCategory {
        id: "reparaciones",
        label: "Reparaciones",
    },
    ServiceCategory {
        id: "hogar",
        label: "Hogar",
    },
    ServiceCategory {
        id: "tramites",
        label: "Trámites",
    },
    ServiceCategory {
        id: "compras",
        label: "Compras",
    },
    ServiceCategory {
        id: "administrativo",
        label: "Administrativo",
    },
];

/// Unknown ids fall back to the first category.
pub fn category_info(id: &str) -> ServiceCategory {
    SERVICE_CATEGORIES
        .iter()
        .copied()
        .find(|category| category.id == id)
        .unwrap_or(SERVICE_CATEGORIES[0])
}

pub fn is_known_category(id: &str) -> bool {
    SERVICE_CATEGORIES.iter().any(|category| category.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListing {
    #[serde(rename = "service_id")]
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "imagen_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "ubicacion", default)]
    pub location: String,
    #[serde(rename = "ciudad", default)]
    pub city: String,
    #[serde(rename = "departamento", default)]
    pub department: String,
    #[serde(rename = "precio_min", default)]
    pub price_min: u64,
    #[serde(rename = "precio_max", default)]
    pub price_max: u64,
    #[serde(rename = "calificacion_promedio", default)]
    pub rating: Option<f64>,
    #[serde(rename = "total_calificaciones", default)]
    pub rating_count: u32,
    #[serde(rename = "prestador_id")]
    pub provider_id: String,
    #[serde(rename = "prestador_nombre", default)]
    pub provider_name: String,
    #[serde(rename = "distancia", default)]
    pub distance_km: Option<f64>,
    #[serde(rename = "fecha_creacion")]
    pub created_on: NaiveDate,
}

pub const DEFAULT_MAX_PRICE: u64 = 1_000_000;

/// Inclusive price bounds; `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceRange")]
pub struct PriceRange {
    min: u64,
    max: u64,
}

#[derive(Deserialize)]
struct RawPriceRange {
    min: u64,
    max: u64,
}

impl TryFrom<RawPriceRange> for PriceRange {
    type Error = MarketError;

    fn try_from(raw: RawPriceRange) -> Result<Self> {
        PriceRange::new(raw.min, raw.max)
    }
}

impl PriceRange {
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min > max {
            return Err(MarketError::validation(
                "priceRange",
                format!("El precio mínimo ({}) supera el máximo ({})", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains_range(&self, low: u64, high: u64) -> bool {
        low >= self.min && high <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Recent,
    PriceAsc,
    PriceDesc,
    Rating,
    Distance,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
            Self::Distance => "distance",
        }
    }
}

/// Unrecognised keys sort by recency.
impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value.trim() {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "distance" => Self::Distance,
            _ => Self::Recent,
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"all"`, `"Todas"` and blank mean no city restriction.
pub fn normalize_city(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(city) if city.eq_ignore_ascii_case("all") || city.eq_ignore_ascii_case("todas") => {
            None
        }
        Some(city) => Some(city.to_string()),
    }
}

fn deserialize_city<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_city(raw.as_deref()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilterSpec {
    pub query: String,
    /// Empty means every category.
    pub categories: BTreeSet<String>,
    #[serde(deserialize_with = "deserialize_city")]
    pub city: Option<String>,
    pub min_rating: f64,
    pub price_range: PriceRange,
    pub sort_by: SortKey,
}

impl Default for SearchFilterSpec {
    fn default() -> Self {
        Self {
            query: String::new(),
            categories: BTreeSet::new(),
            city: None,
            min_rating: 0.0,
            price_range: PriceRange::default(),
            sort_by: SortKey::Recent,
        }
    }
}

impl SearchFilterSpec {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = normalize_city(Some(city));
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = rating;
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = range;
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pendiente,
    Aceptada,
    EnProgreso,
    Completada,
    Cancelada,
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::Aceptada => "Aceptada",
            Self::EnProgreso => "En progreso",
            Self::Completada => "Completada",
            Self::Cancelada => "Cancelada",
        }
    }
}

/// A requester's in-flight request, as shown on their dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequestRecord {
    #[serde(rename = "service_id")]
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "fecha_solicitada")]
    pub requested_date: NaiveDate,
    #[serde(rename = "hora_solicitada", default)]
    pub requested_time: String,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "precio_estimado", default)]
    pub estimated_price: u64,
    #[serde(rename = "estado")]
    pub status: RequestStatus,
    #[serde(rename = "solicitante_id")]
    pub requester_id: String,
    #[serde(rename = "prestador_id", default)]
    pub provider_id: Option<String>,
    #[serde(rename = "prestador_nombre", default)]
    pub provider_name: Option<String>,
    #[serde(rename = "prestador_calificacion", default)]
    pub provider_rating: Option<f64>,
    #[serde(rename = "fecha_creacion")]
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceRequest {
    #[serde(rename = "prestadorId")]
    pub provider_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "precioMin")]
    pub price_min: u64,
    #[serde(rename = "precioMax")]
    pub price_max: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedServiceRequest {
    #[serde(rename = "serviceId")]
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
}

/// `{success, data?, error?}`, the shape every gateway call reports in.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.user_friendly_message()),
        }
    }
}
