use chat_relay::{
    api::{AppState, create_router},
    config::Settings,
    services::{ConversationService, SessionService},
    upstream::{ConversationApi, OpenAiClient},
};
use clap::Parser;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Relays browser chat requests to the upstream conversational API.
#[derive(Debug, Parser)]
#[command(name = "chat-relay", version)]
struct Cli {
    /// Address to bind (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut settings =
        Settings::from_env().map_err(|e| format!("Failed to load settings: {}", e))?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    tracing::info!("Starting chat relay");
    if settings.upstream.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; relay requests will fail until it is");
    }
    if settings.cors.allow_any {
        tracing::warn!("CORS_ALLOW_ANY is set; any origin will be echoed");
    }

    let client = OpenAiClient::new(&settings.upstream)
        .map_err(|e| format!("Failed to build upstream client: {}", e))?;
    let api: Arc<dyn ConversationApi> = Arc::new(client);

    // Initialize services
    let session_service = Arc::new(SessionService::new(
        api.clone(),
        settings.upstream.clone(),
    ));

    let conversation_service = Arc::new(ConversationService::new(
        api.clone(),
        settings.upstream.clone(),
        settings.poll.clone(),
    ));

    // Create application state
    let app_state = AppState {
        session_service,
        conversation_service,
        cors: Arc::new(settings.cors.clone()),
    };

    // Build router
    let app = create_router(app_state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Session endpoint: http://{}/api/session", addr);
    tracing::info!("Chat endpoint: http://{}/api/chat", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut terminate_signal =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    tracing::error!("Failed to listen for Ctrl+C: {}", err);
                }
            },
            _ = terminate_signal.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
        }
    }

    tracing::info!("Shutdown signal received, commencing graceful shutdown");
}
