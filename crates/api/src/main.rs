use std::sync::Arc;
use std::time::Duration;

use quayside_api::app::{self, services::AppServices};
use quayside_infra::{ResearchWorker, WorkerConfig};
use quayside_research::{HttpResearchProvider, ResearchExecutor};

#[tokio::main]
async fn main() {
    quayside_observability::init();

    let provider_url = std::env::var("RESEARCH_PROVIDER_URL")
        .unwrap_or_else(|_| "https://api.perplexity.ai".to_string());
    let api_key = std::env::var("RESEARCH_API_KEY").unwrap_or_else(|_| {
        tracing::warn!(
            "RESEARCH_API_KEY not set; provider calls will fail and surface as report markers"
        );
        String::new()
    });
    let standard_model =
        std::env::var("RESEARCH_MODEL").unwrap_or_else(|_| "sonar-pro".to_string());
    let deep_model = std::env::var("RESEARCH_DEEP_MODEL")
        .unwrap_or_else(|_| "sonar-deep-research".to_string());

    let services = AppServices::in_memory();

    let provider = Arc::new(HttpResearchProvider::new(
        provider_url,
        api_key,
        standard_model,
        deep_model,
    ));
    let executor = Arc::new(ResearchExecutor::new(provider));
    let _worker = ResearchWorker::new(
        services.lifecycle.clone(),
        services.registry.clone(),
        executor,
        WorkerConfig::default(),
    )
    .spawn();

    // Scheduled stale-job sweep, alongside the on-demand cleanup endpoint.
    let reaper = services.reaper.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(300));
        loop {
            tick.tick().await;
            match reaper.reap().await {
                Ok(ids) if !ids.is_empty() => {
                    tracing::info!(cleaned = ids.len(), "reaped stale research jobs")
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "stale job sweep failed"),
            }
        }
    });

    let bind = std::env::var("QUAYSIDE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
