use std::sync::Arc;

use clap::Parser;
use database::{MongoHistoryStore, SessionStore};
use game::GameService;
use server::{build_router, AppState, Params, ServerConfig};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = config.database.create_pool().await?;
    let sessions = SessionStore::new(pool);
    sessions.run_migrations().await?;
    log::info!("Session store ready at {}", config.database.url);

    let history = MongoHistoryStore::connect(&config.history).await?;

    let service = Arc::new(
        GameService::new(sessions, Arc::new(history)).with_history_retry(config.history_retry),
    );
    let app = build_router(AppState::new(Arc::clone(&service)));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("Server running on {}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Params::parse();
    log::debug!("args: {args:?}");

    let config = match ServerConfig::load(args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(config).await {
        log::error!("Server failed: {e}");
        std::process::exit(1);
    }
}
