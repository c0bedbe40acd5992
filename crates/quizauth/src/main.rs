//! Quizauth - authentication service for the quiz platform

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LogFormat};
use quizauth_api::{AppState, create_router};
use quizauth_auth::{
    AuthConfig, AuthInterceptor, AuthService, PasswordHasher, Revocations, TokenCodec,
    spawn_purge_task,
};
use quizauth_db::Database;

/// Quizauth - authentication service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "QUIZAUTH_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "QUIZAUTH_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, config.logging.format);

    info!("Starting Quizauth v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_placeholder_secret() {
        warn!("auth.jwt_secret is the placeholder value; set a real secret before deploying");
    }

    // Create data directory
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Arc::new(
        Database::new(&db_path)
            .await
            .context("Failed to open database")?,
    );

    let revocations = Revocations::new(db.clone(), config.auth.store_timeout());
    let purge_task = spawn_purge_task(
        revocations.clone(),
        config.auth.revocation_purge_interval(),
    );

    let auth = Arc::new(AuthService::new(
        db,
        revocations,
        TokenCodec::new(&config.auth.jwt_secret),
        PasswordHasher::new()?,
        AuthConfig {
            token_ttl: config.auth.token_ttl(),
            store_timeout: config.auth.store_timeout(),
            require_username: config.auth.require_username,
        },
    ));
    let interceptor = Arc::new(AuthInterceptor::with_default_public_operations(auth.clone()));

    let app = create_router(AppState::new(auth, interceptor)).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_task.abort();
    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
