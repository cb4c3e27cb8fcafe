//! Datapolis API server

use std::net::SocketAddr;
use std::sync::Arc;

use datapolis_api::{build_router, AppState, Config};
use datapolis_auth_core::PasswordHasher;
use datapolis_db::{MemoryUserRepository, Repositories, UserRepository};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("datapolis_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Datapolis API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        access_ttl = ?config.auth.access_ttl,
        refresh_ttl = ?config.auth.refresh_ttl,
        "Configuration loaded"
    );
    if config.auth.access_secret.is_none() || config.auth.refresh_secret.is_none() {
        tracing::warn!("JWT_SECRET or REFRESH_TOKEN_SECRET is not set; token operations will fail");
    }

    // Create credential store
    let repo: Arc<dyn UserRepository> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = datapolis_db::create_pool(url).await?;
            tracing::info!("Database pool created");
            Arc::new(Repositories::new(pool).users)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using the in-memory user store");
            Arc::new(MemoryUserRepository::new())
        }
    };

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));

    // Create application state
    let state = AppState::new(repo, config, PasswordHasher::new());

    // Build HTTP router
    let app = build_router(state);

    tracing::info!("HTTP server listening on {}", http_addr);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
