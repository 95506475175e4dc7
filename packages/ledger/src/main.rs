use anyhow::Context;
use axum::http::{self, HeaderValue, Method};
use std::sync::Arc;
use structopt::StructOpt;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vote_circuits::load_verifying_key;
use vote_ledger::{
    app,
    state::AppState,
    utils::{auth::create_token, config::Config},
    Ledger, LedgerStore,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "vote-ledger", about = "anonymous voting ledger")]
struct Opt {
    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// run the ledger server (default)
    #[structopt(name = "serve")]
    Serve,
    /// print a bearer token allowed to submit tally batches
    #[structopt(name = "issue-token")]
    IssueToken {
        #[structopt(long, default_value = "aggregator")]
        subject: String,
        #[structopt(long, default_value = "24")]
        hours: i64,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,axum=debug")),
        )
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: failed to load .env: {}", e);
    }
    init_tracing();

    let opt = Opt::from_args();
    let config = Config::from_env()?;

    match opt.command.unwrap_or(Command::Serve) {
        Command::IssueToken { subject, hours } => {
            let token = create_token(&subject, &config.jwt_secret, chrono::Duration::hours(hours))?;
            println!("{}", token);
            Ok(())
        }
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let verifying_key = load_verifying_key(&config.artifacts_dir)
        .with_context(|| format!("loading verifying key from {}", config.artifacts_dir.display()))?;

    let store = match &config.db_path {
        Some(path) => LedgerStore::persistent(path)?,
        None => {
            warn!("no ledger db configured; ledger state will not survive a restart");
            LedgerStore::in_memory()
        }
    };
    let ledger = Ledger::open(store, verifying_key)?;

    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("CORS_ORIGIN is invalid: {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin([origin])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);

    let addr = config.bind_addr;
    let state = AppState::new(Arc::new(ledger), Arc::new(config));

    let app = app::create_app(state).layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("vote ledger listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
