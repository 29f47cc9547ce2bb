use crate::core::requests::RequestDraft;
use crate::domain::model::{
    normalize_city, AccountStatus, PriceRange, RegistrationDraft, SearchFilterSpec, SortKey,
    DEFAULT_MAX_PRICE,
};
use crate::utils::error::{MarketError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "manos-amigas")]
#[command(about = "Command-line client for the ManosAmigas service marketplace")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Override api.base_url from the configuration")]
    pub api_base_url: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search service listings (requires a session)
    Search(SearchArgs),
    /// Log in and report where the account lands
    Login(CredentialArgs),
    /// Walk the registration wizard with a draft read from a TOML file
    Register {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Review user accounts (admin)
    Accounts {
        #[command(flatten)]
        auth: CredentialArgs,
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage the requester's service requests
    Request {
        #[command(flatten)]
        auth: CredentialArgs,
        #[command(subcommand)]
        action: RequestAction,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CredentialArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub auth: CredentialArgs,

    #[arg(long, default_value = "")]
    pub query: String,

    #[arg(long = "category")]
    pub categories: Vec<String>,

    #[arg(long, default_value = "Todas")]
    pub city: String,

    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f64,

    #[arg(long, default_value_t = 0)]
    pub price_min: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_PRICE)]
    pub price_max: u64,

    #[arg(long, default_value = "recent")]
    pub sort: String,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, help = "Query the listing endpoint instead of the built-in catalogue")]
    pub remote: bool,
}

impl SearchArgs {
    pub fn to_filter(&self) -> Result<SearchFilterSpec> {
        if !self.min_rating.is_finite() {
            return Err(MarketError::validation(
                "minRating",
                format!("Calificación mínima inválida: {}", self.min_rating),
            ));
        }
        Ok(SearchFilterSpec {
            query: self.query.trim().to_string(),
            categories: self.categories.iter().cloned().collect(),
            city: normalize_city(Some(&self.city)),
            min_rating: self.min_rating,
            price_range: PriceRange::new(self.price_min, self.price_max)?,
            sort_by: SortKey::from(self.sort.as_str()),
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum AccountAction {
    /// List accounts, optionally only those with one status (U, V or S)
    List {
        #[arg(long)]
        status: Option<AccountStatus>,
    },
    Approve { person_id: String },
    Suspend { person_id: String },
}

#[derive(Debug, Subcommand)]
pub enum RequestAction {
    List,
    Create {
        #[arg(long)]
        provider_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price_min: u64,
        #[arg(long)]
        price_max: u64,
    },
}

impl RequestAction {
    pub fn to_draft(&self) -> Option<RequestDraft> {
        match self {
            Self::List => None,
            Self::Create {
                provider_id,
                title,
                description,
                category,
                price_min,
                price_max,
            } => Some(RequestDraft {
                provider_id: provider_id.clone(),
                title: title.clone(),
                description: description.clone(),
                category: category.clone(),
                price_min: *price_min,
                price_max: *price_max,
            }),
        }
    }
}

/// Reads a registration draft written with the wire's camelCase keys.
pub fn load_draft(path: &Path) -> Result<RegistrationDraft> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| MarketError::ConfigValidationError {
        field: "draft".to_string(),
        message: format!("TOML parsing error: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_search_arguments_build_filter() {
        let cli = CliConfig::parse_from([
            "manos-amigas",
            "search",
            "--email",
            "ana@correo.com",
            "--password",
            "Segura123",
            "--query",
            "plomería",
            "--category",
            "reparaciones",
            "--category",
            "hogar",
            "--sort",
            "price-asc",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(filter.query, "plomería");
        assert_eq!(filter.categories.len(), 2);
        assert_eq!(filter.city, None);
        assert_eq!(filter.sort_by, SortKey::PriceAsc);
    }

    #[test]
    fn test_inverted_price_bounds_are_rejected() {
        let cli = CliConfig::parse_from([
            "manos-amigas",
            "search",
            "--email",
            "ana@correo.com",
            "--password",
            "Segura123",
            "--price-min",
            "9",
            "--price-max",
            "1",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_non_finite_min_rating_is_rejected() {
        let cli = CliConfig::parse_from([
            "manos-amigas",
            "search",
            "--email",
            "ana@correo.com",
            "--password",
            "Segura123",
            "--min-rating",
            "NaN",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_search_requires_credentials() {
        assert!(CliConfig::try_parse_from(["manos-amigas", "search", "--query", "aseo"]).is_err());

        let cli = CliConfig::parse_from([
            "manos-amigas",
            "search",
            "--email",
            "ana@correo.com",
            "--password",
            "Segura123",
            "--remote",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.auth.email, "ana@correo.com");
        assert_eq!(args.auth.password, "Segura123");
        assert!(args.remote);
        assert_eq!(args.page, 1);
    }

    #[test]
    fn test_account_status_argument_parses_codes() {
        let cli = CliConfig::parse_from([
            "manos-amigas",
            "accounts",
            "--email",
            "admin@correo.com",
            "--password",
            "Admin1234",
            "list",
            "--status",
            "U",
        ]);
        match cli.command {
            Command::Accounts {
                action: AccountAction::List { status },
                ..
            } => assert_eq!(status, Some(AccountStatus::Unverified)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_load_draft_reads_camel_case_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                r#"
name = "Juan Pérez"
email = "juan@correo.com"
phone = "3001234567"
birthDate = "1990-05-20"
documentType = "CC"
documentNumber = "1098765432"
city = "Bogotá"
acceptTerms = true
acceptDataTreatment = true

[documentFront]
fileName = "frente.jpg"
contentType = "image/jpeg"
sizeBytes = 200000

[selfieWithDocument]
fileName = "selfie.pdf"
contentType = "application/pdf"
sizeBytes = 1024
"#
                .as_bytes(),
            )
            .unwrap();

        let draft = load_draft(temp_file.path()).unwrap();
        assert_eq!(draft.name, "Juan Pérez");
        assert_eq!(draft.birth_date, "1990-05-20");
        assert_eq!(draft.document_number, "1098765432");
        assert!(draft.accept_terms);
        assert!(!draft.receive_notifications);
        assert!(draft.document_back.is_none());
        let front = draft.document_front.as_ref().unwrap();
        assert_eq!(front.file_name, "frente.jpg");
        assert_eq!(front.size_bytes, 200_000);
        assert_eq!(
            draft.selfie_with_document.as_ref().map(|f| f.content_type.as_str()),
            Some("application/pdf")
        );
    }

    #[test]
    fn test_load_draft_reports_malformed_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"name = \"sin cerrar\n").unwrap();
        match load_draft(temp_file.path()) {
            Err(MarketError::ConfigValidationError { field, .. }) => assert_eq!(field, "draft"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
