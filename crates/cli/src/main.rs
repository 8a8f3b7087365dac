//! Haberdash CLI - command-line storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Log in (token persists across invocations)
//! haberdash auth login -u alice -p hunter2
//!
//! # Browse the catalog
//! haberdash catalog products --featured
//! haberdash catalog home
//!
//! # Work the cart
//! haberdash cart add 7 --quantity 2
//! haberdash cart show
//!
//! # Place an order from the cart
//! haberdash orders place --address "1 Savile Row" --phone 5550100
//!
//! # Staff-only management surface
//! haberdash admin order-stats
//! ```
//!
//! # Environment Variables
//!
//! - `HABERDASH_API_URL` - backend base URL (required)
//! - `HABERDASH_TOKEN_FILE` - auth token path (default `.haberdash_token`)
//! - `HABERDASH_TIMEOUT_SECS` - request timeout (default 30)
//! - `SENTRY_DSN` - optional error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use haberdash_client::{ApiClient, CartStore, ClientConfig, FileTokenStore, SessionStore};

mod commands;

use commands::CliError;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "haberdash")]
#[command(author, version, about = "Haberdash storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the login session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse products and categories
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// View and modify the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// View and place orders
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
    /// Staff-only management commands
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprint_startup_error(&e);
            std::process::exit(2);
        }
    };

    // Sentry must come up before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "haberdash_cli=info,haberdash_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Tracing is not up yet when configuration loading fails.
#[allow(clippy::print_stderr)]
fn eprint_startup_error(e: &dyn std::error::Error) {
    eprintln!("configuration error: {e}");
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CliError> {
    let api = ApiClient::new(config)?;
    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let session = SessionStore::new(api.clone(), tokens);
    session.initialize().await;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(action, &session).await,
        Commands::Catalog { action } => commands::catalog::run(action, &api).await,
        Commands::Cart { action } => {
            let cart = CartStore::new(api.clone(), session.clone());
            commands::cart::run(action, &cart).await
        }
        Commands::Orders { action } => commands::orders::run(action, &api, &session).await,
        Commands::Admin { action } => commands::admin::run(action, &api, &session).await,
    }
}
