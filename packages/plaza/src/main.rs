use anyhow::{Context, Result};
use axum::{Router, routing::get};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::info;
use tracing_subscriber::prelude::*;
use uuid::Uuid;

mod config;
mod handlers;
mod metrics;
mod views;
mod ws;

use crate::config::PlazaConfig;
use crate::metrics::ServerMetrics;
use plaza_chat::ChatRoom;

/// Custom span maker that adds a unique request ID to each incoming request
#[derive(Clone)]
struct RequestIdMakeSpan;

impl<B> MakeSpan<B> for RequestIdMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> tracing::Span {
        let request_id = Uuid::new_v4().to_string();
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

#[derive(Parser)]
#[command(name = "plaza")]
#[command(about = "Real-time chat service for the Plaza storefront portal")]
struct Cli {
    /// Port for the web server
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(short = 'b', long)]
    host: Option<String>,

    /// Directory holding config.toml (defaults to the working directory)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub room: Arc<ChatRoom>,
    /// Server metrics for observability
    pub metrics: Arc<ServerMetrics>,
    pub config: Arc<PlazaConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_directive = if cli.debug {
        "plaza=debug,tower_http=debug,info"
    } else {
        "plaza=info,tower_http=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    info!("Starting Plaza chat service");

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve working directory")?,
    };
    let figment = config::load_config(&data_dir);
    let mut config = PlazaConfig::from_figment(&figment).context("Invalid configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    info!(
        "Server config: greeting={:?}, send_queue={}",
        config.greeting, config.send_queue
    );

    let room = Arc::new(ChatRoom::with_greeting(&config.greeting));
    let metrics = Arc::new(ServerMetrics::new());

    let app_state = AppState {
        room,
        metrics,
        config: Arc::new(config.clone()),
    };

    // Build routes
    let app = Router::new()
        .route("/", get(views::index_page))
        .route("/chat", get(views::chat_page))
        // Chat API
        .route("/api/ws", get(handlers::chat_websocket_handler))
        .route("/api/chat/participants", get(handlers::list_participants))
        // Health endpoints
        .route("/health", get(handlers::health_handler))
        .route("/health/live", get(handlers::health_live_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("{}:{}", config.host, config.port)
        .parse::<SocketAddr>()
        .context("Invalid host/port")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Plaza listening on http://{}", actual_addr);
    info!("  Chat page:  http://{}/chat", actual_addr);
    info!("  WebSocket:  ws://{}/api/ws", actual_addr);
    info!("  Health:     http://{}/health", actual_addr);

    // Create shutdown signal handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received shutdown signal, shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")
}
