//! DevLog Binary Entry Point
//!
//! This binary runs the DevLog journal service.
//! Core functionality is provided by the `devlog` library crate.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use devlog::{
    StorageBuilder, StorageHandles,
    config::{AppConfig, Environment, parse_duration},
    server::{AppState, create_router},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// DevLog - Developer Journal Service
#[derive(Parser, Debug)]
#[command(name = "devlog", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (optional; defaults apply without one)
    #[arg(short, long, env = "DEVLOG_CONFIG")]
    config: Option<String>,

    /// Runtime environment: development, production, or test
    #[arg(short, long, env = "DEVLOG_ENV")]
    environment: Option<Environment>,

    /// Server bind address (overrides config file)
    #[arg(long, env = "DEVLOG_BIND")]
    bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Allowed CORS origins, comma-separated (overrides config file)
    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Directory with a built UI to serve (overrides config file)
    #[arg(long, env = "DEVLOG_STATIC_DIR")]
    static_dir: Option<String>,

    /// Maximum number of stored entries
    #[arg(long, env = "MAX_ENTRIES")]
    max_entries: Option<usize>,

    /// Maximum message length in characters
    #[arg(long, env = "MAX_MESSAGE_LENGTH")]
    max_message_length: Option<usize>,

    /// Maximum tag length in characters
    #[arg(long, env = "MAX_TAG_LENGTH")]
    max_tag_length: Option<usize>,

    /// Maximum category length in characters
    #[arg(long, env = "MAX_CATEGORY_LENGTH")]
    max_category_length: Option<usize>,

    /// Maximum number of tags per entry
    #[arg(long, env = "MAX_TAGS_PER_ENTRY")]
    max_tags_per_entry: Option<usize>,

    /// Rate limit window, e.g. "15m" (overrides config file)
    #[arg(long, value_parser = parse_duration)]
    rate_limit_window: Option<Duration>,
}

impl Cli {
    /// Apply CLI/env overrides (CLI > ENV > config file).
    fn apply(self, config: &mut AppConfig) {
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(cors_origin) = self.cors_origin {
            config.server.cors_origin = cors_origin;
        }
        if let Some(static_dir) = self.static_dir {
            config.server.static_dir = Some(static_dir);
        }
        if let Some(max) = self.max_entries {
            config.limits.max_entries = max;
        }
        if let Some(max) = self.max_message_length {
            config.limits.max_message_length = max;
        }
        if let Some(max) = self.max_tag_length {
            config.limits.max_tag_length = max;
        }
        if let Some(max) = self.max_category_length {
            config.limits.max_category_length = max;
        }
        if let Some(max) = self.max_tags_per_entry {
            config.limits.max_tags_per_entry = max;
        }
        if let Some(window) = self.rate_limit_window {
            config.rate_limit.window = window;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,devlog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("DevLog - Developer Journal Service");

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file, if any
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            AppConfig::default()
        }
    };

    cli.apply(&mut config);
    config.validate()?;

    if let Some(dir) = &config.server.static_dir
        && !Path::new(dir).is_dir()
    {
        tracing::warn!("Static directory does not exist: {}", dir);
    }

    tracing::info!(
        environment = %config.environment,
        max_entries = config.limits.max_entries,
        rate_limit = config.rate_limit.enabled,
        "Server: {}:{}, CORS origin: {}",
        config.server.bind,
        config.server.port,
        config.server.cors_origin,
    );

    // Build storage layer
    let handles = StorageBuilder::new().limits(config.limits).build();
    tracing::info!("Storage initialized");

    // Create web server state
    let app_state = AppState::new(handles.store.clone(), config.environment)
        .with_server(config.server.clone())
        .with_rate_limit(config.rate_limit.clone());

    // Build Axum router
    let app = create_router(app_state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(handles))
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal(handles: StorageHandles) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }

    tracing::info!("Shutting down storage...");
    let dropped = handles.shutdown().await;
    tracing::info!("Discarded {} in-memory entries", dropped);
}
