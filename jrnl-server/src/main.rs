//! jrnl-server - journaling service with LLM mood analysis
//!
//! Startup: tracing → build identification → configuration → database →
//! shared secret → provider → serve.

use anyhow::{Context, Result};
use clap::Parser;
use jrnl_common::api::auth::load_shared_secret;
use jrnl_common::config::{load_toml_config, RootFolderInitializer};
use jrnl_common::db::init_database;
use jrnl_server::config::{Cli, ServiceConfig};
use jrnl_server::llm::build_provider;
use jrnl_server::{build_router, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification before any slow startup step
    info!(
        "Starting jrnl-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let toml_config = load_toml_config().context("Failed to load config file")?;
    let config = match ServiceConfig::resolve(&cli, &toml_config) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let shared_secret = load_shared_secret(&pool)
        .await
        .context("Failed to load API shared secret")?;
    if shared_secret == 0 {
        info!("API authentication disabled (shared_secret = 0)");
    } else {
        info!("✓ Loaded shared secret for API authentication");
    }

    let provider = build_provider(&config.llm).context("Failed to configure LLM provider")?;

    let state = AppState::new(pool, shared_secret, provider);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("jrnl-server listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
