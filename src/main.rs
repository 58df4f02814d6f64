use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_handler::config::Config;
use schedule_handler::AppState;

#[derive(Parser, Debug)]
#[command(name = "schedule-handler")]
#[command(author, version, about = "Review-session scheduling service", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SCHEDULE_HANDLER_CONFIG", default_value = "schedule-handler.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the data directory
    #[arg(long, env = "SCHEDULE_HANDLER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long, env = "SCHEDULE_HANDLER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.server.data_dir = data_dir;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Schedule Handler v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(AppState::init(config.clone()).await?);
    let api_router = schedule_handler::api::create_router(state);

    // Serve the UI bundle with SPA fallback when one is configured
    let app = match config.server.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        Some(static_dir) => {
            tracing::info!("Serving static files from {}", static_dir.display());
            let index_file = static_dir.join("index.html");
            let serve_static =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));
            api_router.fallback_service(serve_static)
        }
        None => api_router,
    };

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
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

    tracing::info!("Shutdown signal received");
}
