//! Storyteller Engine - Main entry point.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyteller_engine::infrastructure::{
    artifacts::FileArtifactStore,
    clock::SystemRandom,
    comfyui::ComfyUIClient,
    openai_compat::ChatCompletionsClient,
    ports::ImageGenPort,
    resilient_llm::{ResilientLlmClient, RetryConfig},
    speech::SpeechClient,
};
use storyteller_engine::{api, App, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyteller_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Storyteller Engine");

    let config = EngineConfig::from_env()?;

    // Create infrastructure clients
    let chat_client = Arc::new(ChatCompletionsClient::new(
        &config.llm_base_url,
        &config.llm_model,
        config.llm_timeout,
    ));
    let retry_config = RetryConfig::default().with_max_retries(config.llm_max_retries);
    tracing::info!(
        base_url = %config.llm_base_url,
        model = %chat_client.model(),
        max_retries = retry_config.max_retries,
        "LLM client configured"
    );
    let llm = Arc::new(ResilientLlmClient::new(chat_client, retry_config));

    let mut comfyui = ComfyUIClient::new(&config.comfyui_url);
    if let Some(checkpoint) = &config.comfyui_checkpoint {
        comfyui = comfyui.with_checkpoint(checkpoint.clone());
    }
    let image_gen = Arc::new(comfyui);
    match image_gen.check_health().await {
        Ok(true) => tracing::info!(url = %config.comfyui_url, "ComfyUI reachable"),
        _ => tracing::warn!(
            url = %config.comfyui_url,
            "ComfyUI not reachable, scenes will be text-only until it is"
        ),
    }

    let speech = Arc::new(SpeechClient::new(&config.tts_base_url, &config.tts_model));

    let artifacts = FileArtifactStore::new(config.media_dir.clone(), Arc::new(SystemRandom));
    artifacts
        .ensure_root()
        .await
        .with_context(|| format!("creating media directory {}", config.media_dir.display()))?;

    // Create application
    let app = Arc::new(App::new(
        llm,
        image_gen,
        speech,
        Arc::new(artifacts),
        &config,
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr = config.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
