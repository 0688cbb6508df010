mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealog_core::{
    create_authenticator, load_config, validate_config, AnthropicClient, Authenticator,
    FatSecretClient, FoodExtractor, LlmEstimator, LlmFoodExtractor, LlmProvider, MealPipeline,
    MealStore, NutrientEstimator, NutritionSource, OllamaClient, SourceResolver, SqliteMealStore,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mealog {}", VERSION);

    // Determine config path
    let config_path = std::env::var("MEALOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        "Configuration loaded (hash {}), auth method: {:?}",
        &config_hash[..16],
        config.auth.method
    );

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite meal store
    let store: Arc<dyn MealStore> = Arc::new(
        SqliteMealStore::new(&config.database.path).context("Failed to create meal store")?,
    );
    info!("Meal store initialized at {:?}", config.database.path);

    // Create the nutrition source if credentials are configured. Without
    // it every food routes straight to the generative fallback.
    let source: Option<Arc<dyn NutritionSource>> = match &config.fatsecret {
        Some(fatsecret_config) => {
            info!("Initializing FatSecret client");
            Some(Arc::new(FatSecretClient::new(fatsecret_config.clone())))
        }
        None => {
            info!("FatSecret not configured, measured resolution disabled");
            None
        }
    };

    // Create the LLM-backed extractor and estimator
    let (estimator, extractor): (
        Option<Arc<dyn NutrientEstimator>>,
        Option<Arc<dyn FoodExtractor>>,
    ) = match &config.llm {
        Some(llm_config) => match llm_config.provider {
            LlmProvider::Anthropic => {
                info!("Initializing Anthropic client ({})", llm_config.model);
                let mut client = AnthropicClient::new(
                    llm_config.api_key.clone().unwrap_or_default(),
                    llm_config.model.clone(),
                );
                if let Some(api_base) = &llm_config.api_base {
                    client = client.with_api_base(api_base.clone());
                }
                let client = Arc::new(client);
                (
                    Some(Arc::new(LlmEstimator::new(Arc::clone(&client)))),
                    Some(Arc::new(LlmFoodExtractor::new(client))),
                )
            }
            LlmProvider::Ollama => {
                info!("Initializing Ollama client ({})", llm_config.model);
                let mut client = OllamaClient::new(llm_config.model.clone());
                if let Some(api_base) = &llm_config.api_base {
                    client = client.with_api_base(api_base.clone());
                }
                let client = Arc::new(client);
                (
                    Some(Arc::new(LlmEstimator::new(Arc::clone(&client)))),
                    Some(Arc::new(LlmFoodExtractor::new(client))),
                )
            }
        },
        None => {
            info!("No LLM configured, extraction and fallback estimation disabled");
            (None, None)
        }
    };

    // Assemble the pipeline
    let mut pipeline = MealPipeline::new(SourceResolver::new(source));
    if let Some(estimator) = estimator {
        pipeline = pipeline.with_estimator(estimator);
    }
    let pipeline = Arc::new(pipeline);
    info!("Quantification pipeline ready");

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        store,
        pipeline,
        extractor,
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
