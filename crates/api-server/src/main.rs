use std::sync::Arc;

use api_server::http::{self, AppState};
use shared::chat::ChatService;
use shared::config::{ApiConfig, load_dotenv};
use shared::history::HistoryStore;
use shared::llm::{API_KEY_ENV_VARS, CompletionClient, GeminiGateway};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_server=debug,shared=info,axum=info".to_string()),
        )
        .init();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let gateway = match GeminiGateway::new(config.gemini.clone()) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to build gemini gateway: {err}");
            std::process::exit(1);
        }
    };
    if config.gemini.api_key.is_none() {
        warn!(
            env_vars = ?API_KEY_ENV_VARS,
            "no generative AI api key configured; /ask will report an error"
        );
    }
    info!(
        model = gateway.model(),
        history_path = %config.history_path.display(),
        "chat backend configured"
    );

    let chat = ChatService::new(
        CompletionClient::new(Arc::new(gateway)),
        HistoryStore::new(config.history_path),
    );
    let app = http::build_router(AppState { chat });

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", config.bind_addr);
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(config.bind_addr)
    );
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server exited with error: {err}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        return;
    }
    info!("shutdown signal received");
}
