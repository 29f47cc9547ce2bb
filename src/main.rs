use clap::Parser;
use manos_amigas::config::cli::{AccountAction, Command, CredentialArgs, RequestAction, SearchArgs};
use manos_amigas::config::toml_config::LogFormat;
use manos_amigas::core::admin::{AccountReview, StatusFilter};
use manos_amigas::core::requests::{submit_request, RequestBoard};
use manos_amigas::domain::model::{Outcome, Role};
use manos_amigas::domain::ports::ListingSource;
use manos_amigas::utils::error::{ErrorSeverity, MarketError, Result};
use manos_amigas::utils::{logger, validation::Validate};
use manos_amigas::{
    ApiClient, AppConfig, AppState, CliConfig, SampleCatalog, SearchResults, StepOutcome, View,
};
use serde::Serialize;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(base_url) = &cli.api_base_url {
        config.api.base_url = base_url.clone();
    }

    match config.logging.format {
        LogFormat::Json => logger::init_json_logger(&config.logging.level),
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
    }
    tracing::debug!("Configuration: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        print_json(&Outcome::<()>::failure(e.user_friendly_message()))?;
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Search(args) => search(args, config).await,
        Command::Login(auth) => {
            let api = ApiClient::from_config(&config.api)?;
            let state = login(&api, &auth).await?;
            print_json(&Outcome::ok(json!({
                "view": format!("{:?}", state.view()),
                "message": state.notification().map(|n| n.message.clone()),
            })))
        }
        Command::Register { draft } => register(&draft, config).await,
        Command::Accounts { auth, action } => accounts(auth, action, config).await,
        Command::Request { auth, action } => requests(auth, action, config).await,
    }
}

async fn login(api: &ApiClient, auth: &CredentialArgs) -> Result<AppState> {
    let mut state = AppState::new();
    state.go_to_login();
    if !state.login(api, &auth.email, &auth.password).await {
        let message = state
            .notification()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "Error al iniciar sesión".to_string());
        return Err(MarketError::api(None, message));
    }
    Ok(state)
}

async fn search(args: SearchArgs, config: &AppConfig) -> Result<()> {
    let filter = args.to_filter()?;
    let api = ApiClient::from_config(&config.api)?;
    let mut state = login(&api, &args.auth).await?;
    state.go_to_search()?;

    let catalog = SampleCatalog::new();
    let source: &dyn ListingSource = if args.remote || config.search.use_remote {
        &api
    } else {
        &catalog
    };

    let mut view = SearchResults::new(config.search.page_size);
    let total = view.search(source, filter).await?;
    if args.page != 1 && !view.results_mut().go_to(args.page) {
        tracing::warn!(
            "Page {} is out of range; showing page {}",
            args.page,
            view.results().current_page()
        );
    }

    let results = view.results();
    print_json(&Outcome::ok(json!({
        "total": total,
        "page": results.current_page(),
        "totalPages": results.total_pages(),
        "items": results.page_items(),
    })))
}

async fn register(path: &std::path::Path, config: &AppConfig) -> Result<()> {
    let draft = manos_amigas::config::cli::load_draft(path)?;
    let api = ApiClient::from_config(&config.api)?;
    let mut state = AppState::new();
    state.go_to_register();
    if let Some(wizard) = state.registration_mut() {
        *wizard.draft_mut() = draft;
    }

    loop {
        match state.advance_registration(&api).await? {
            StepOutcome::Advanced(step) => {
                tracing::info!("Step {} ({}) complete", step.number() - 1, step.title());
            }
            StepOutcome::Invalid => {
                let errors = state
                    .registration()
                    .map(|w| {
                        w.errors()
                            .iter()
                            .map(|(field, message)| format!("{}: {}", field, message))
                            .collect::<Vec<_>>()
                            .join("; ")
                    })
                    .unwrap_or_default();
                return Err(MarketError::validation("draft", errors));
            }
            StepOutcome::Pending => {
                return Err(MarketError::precondition("a registration is already pending"));
            }
            StepOutcome::Submitted(user) => {
                return print_json(&Outcome::ok(json!({
                    "view": format!("{:?}", state.view()),
                    "user": user,
                })));
            }
            StepOutcome::Failed(e) => return Err(e),
        }
    }
}

async fn accounts(auth: CredentialArgs, action: AccountAction, config: &AppConfig) -> Result<()> {
    let api = ApiClient::from_config(&config.api)?;
    let state = login(&api, &auth).await?;
    if state.view() != View::AdminDashboard {
        return Err(MarketError::precondition(
            "account review requires a verified admin account",
        ));
    }

    let mut review = AccountReview::new(config.admin.page_size);
    match action {
        AccountAction::List { status } => {
            let filter = status.map_or(StatusFilter::All, StatusFilter::Only);
            review.set_filter(&api, filter).await?;
            let counts = review.counts();
            print_json(&Outcome::ok(json!({
                "filter": filter.label(),
                "counts": {
                    "all": counts.all,
                    "U": counts.unverified,
                    "V": counts.verified,
                    "S": counts.suspended,
                },
                "accounts": review.accounts().items(),
            })))
        }
        AccountAction::Approve { person_id } => {
            review.refresh(&api).await?;
            review.approve(&api, &person_id).await?;
            print_notification(&review)
        }
        AccountAction::Suspend { person_id } => {
            review.refresh(&api).await?;
            review.suspend(&api, &person_id).await?;
            print_notification(&review)
        }
    }
}

fn print_notification(review: &AccountReview) -> Result<()> {
    print_json(&Outcome::ok(json!({
        "message": review.notification().map(|n| n.message.clone()),
    })))
}

async fn requests(auth: CredentialArgs, action: RequestAction, config: &AppConfig) -> Result<()> {
    let api = ApiClient::from_config(&config.api)?;
    let mut state = login(&api, &auth).await?;
    let requester_id = match state.session().map(|s| s.user()) {
        Some(user) if user.role == Role::Requester => user.id.clone(),
        _ => {
            return Err(MarketError::precondition(
                "service requests are managed from a requester account",
            ))
        }
    };
    state.go_to_dashboard()?;

    match action.to_draft() {
        Some(draft) => {
            let created = submit_request(&api, draft).await?;
            print_json(&Outcome::ok(created))
        }
        None => {
            let mut board = RequestBoard::new();
            board.load(&api, &requester_id).await?;
            print_json(&Outcome::ok(board.visible()))
        }
    }
}
