use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_api::ai::AiGateway;
use career_api::config::Config;
use career_api::db::create_pool;
use career_api::identity::firebase::FirebaseIdentity;
use career_api::llm_client::{LlmClient, TextGenerator};
use career_api::routes::build_router;
use career_api::state::AppState;
use career_api::store::postgres::PgDocumentStore;
use career_api::store::DocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},{}={level}",
                career_api::LOG_TARGET,
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the document store
    let db = create_pool(&config.database_url).await?;
    let store = PgDocumentStore::new(db);
    store.ensure_collections().await?;

    // Initialize identity provider
    let identity = FirebaseIdentity::new(
        config.firebase_api_key.clone(),
        config.federated_request_uri.clone(),
    );
    info!("Identity provider client initialized");

    // Initialize LLM client, if a credential is configured
    let generator: Option<Arc<dyn TextGenerator>> = match &config.openai_api_key {
        Some(key) => {
            let llm = LlmClient::new(
                key.clone(),
                config.openai_api_base.clone(),
                config.openai_model.clone(),
            );
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(llm))
        }
        None => {
            warn!("OPENAI_API_KEY not set; AI routes will return placeholder responses");
            None
        }
    };

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        identity: Arc::new(identity),
        ai: AiGateway::new(generator),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
