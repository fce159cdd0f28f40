use hermes::{
    api, embedding::HttpEmbedder, types, utils::config::Config, AppState, RegistryService,
    StoreProvider,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting H.E.R.M.E.S - Hybrid Embedding Registry & Matching Engine Server");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Initialize the agent store
    let provider = StoreProvider::from_env();
    let store = provider.create_store().await?;
    tracing::info!("Agent store initialized");

    // Initialize the registry, with an embedder when one is configured
    let mut registry = RegistryService::new(Arc::clone(&store));
    if let Some(url) = &config.embedding.url {
        registry = registry.with_embedder(Arc::new(HttpEmbedder::new(
            url.clone(),
            config.embedding.dimension,
        )));
        tracing::info!(
            url = %url,
            dimension = config.embedding.dimension,
            "Embedding client initialized"
        );
    } else {
        tracing::warn!("EMBEDDING_URL not set; agent discovery will be unavailable");
    }

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::clone(&store),
        registry: Arc::new(registry),
    };

    // Build OpenAPI documentation
    #[derive(OpenApi)]
    #[openapi(
        paths(
            api::handlers::agents::register_agent,
            api::handlers::agents::get_agent,
            api::handlers::agents::list_agents,
            api::handlers::agents::update_agent,
            api::handlers::agents::delete_agent,
            api::handlers::discovery::discover,
        ),
        components(schemas(
            types::AgentCard,
            types::AgentSkill,
            types::RegisterAgentRequest,
            types::UpdateAgentRequest,
            types::DiscoverRequest,
            types::AgentRecordResponse,
            types::AgentListResponse,
            types::PaginationResponse,
            types::ScoredAgentResponse,
            types::DiscoverResponse,
        )),
        tags(
            (name = "agents", description = "Agent registration and lifecycle"),
            (name = "discovery", description = "Semantic agent discovery"),
        ),
        info(
            title = "H.E.R.M.E.S Agent Broker API",
            version = "0.1.0",
            description = "Agent registry with hybrid semantic discovery"
        )
    )]
    struct ApiDoc;

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(api::handlers::health::health_check))
        // API routes
        .nest("/api", api::routes::create_router())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // All in-flight requests have drained; release the store.
    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "failed to close agent store");
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
