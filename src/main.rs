//! Paper Assistant - chat assistant for research-paper questions
//!
//! Answers each inbound chat message by formulating search queries, reading
//! the most relevant paper, and synthesizing a bounded reply.

mod api;
mod commands;
mod config;
mod fetch;
mod llm;
mod pipeline;
mod prompts;
mod stages;
mod state_machine;
mod transcript;

use api::{create_router, AppState};
use config::AppConfig;
use fetch::{HttpFetcher, OcrClient};
use llm::{LlmService, LoggingService, MistralService};
use pipeline::{
    CompletionClient, DocumentFetcher, ServiceCompletionClient, TurnOrchestrator,
    WebDocumentFetcher,
};
use prompts::{load_search_reference, Prompts};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcript::TranscriptStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_assistant=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();

    let api_key = config.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("MISTRAL_API_KEY is not set; completion and conversion calls will fail");
        String::new()
    });

    let search_reference = load_search_reference(config.search_query_information.as_deref())
        .map_err(|e| {
            format!(
                "Failed to read SEARCH_QUERY_INFORMATION {:?}: {e}",
                config.search_query_information
            )
        })?;
    let prompts = Prompts::new(&search_reference, config.max_message_characters);

    // Completion client
    let mistral = MistralService::new(
        api_key.clone(),
        config.model.clone(),
        &config.base_url,
        config.request_timeout,
    )?;
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(mistral)));
    let client: Arc<dyn CompletionClient> = Arc::new(ServiceCompletionClient::new(
        service,
        config.request_timeout,
    ));

    // Document fetcher
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(WebDocumentFetcher::new(
        HttpFetcher::new(config.request_timeout)?,
        OcrClient::new(
            api_key,
            config.ocr_model.clone(),
            &config.base_url,
            config.request_timeout,
        )?,
    ));

    let store = Arc::new(TranscriptStore::new(config.max_history));
    let orchestrator = TurnOrchestrator::new(
        store,
        Arc::new(client),
        Arc::new(fetcher),
        &prompts,
        config.max_message_characters,
    );

    tracing::info!(
        model = %config.model,
        ocr_model = %config.ocr_model,
        max_history = config.max_history,
        max_message_characters = config.max_message_characters,
        auth = config.platform_token.is_some(),
        "Pipeline initialized"
    );

    // Create application state
    let state = AppState::new(
        orchestrator,
        config.command_prefix.clone(),
        config.max_message_characters,
        config.platform_token.clone(),
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Paper assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
