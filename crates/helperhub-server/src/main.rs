mod config;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use helperhub_api::{AppState, AppStateInner, AuthPolicy};
use helperhub_db::Database;
use helperhub_identity::IdentityGateway;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helperhub=debug,tower_http=debug".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    let db = Database::open(&config.db_path).map_err(|e| {
        anyhow::anyhow!("cannot open database at {}: {}", config.db_path.display(), e)
    })?;

    let identity = IdentityGateway::new(config.identity.clone())?;

    if config.auth_policy == AuthPolicy::Open {
        warn!("Mutating routes are unauthenticated; set HELPERHUB_REQUIRE_AUTH=true to protect them");
    }

    let state: AppState = Arc::new(AppStateInner { db, identity });

    let app = helperhub_api::router(state, config.auth_policy)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HelperHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
