use crate::{AppState, EventPipeline, router, shutdown};
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tweetcal_config::ServiceConfig;
use tweetcal_llm::extract::EventExtractor;
use tweetcal_llm::openai::{OpenAiClient, OpenAiSettings};
use tweetcal_social::twitter::TwitterApi;

/// Build the API clients once from `cfg` and wire them into a pipeline.
pub fn build_pipeline(cfg: &ServiceConfig) -> anyhow::Result<EventPipeline> {
    let twitter = TwitterApi::new(cfg.twitter.bearer_token.clone(), &cfg.twitter.endpoint)
        .context("failed to build twitter client")?
        .with_timeout(cfg.http.timeout())
        .with_retries(cfg.http.retries);

    let openai = OpenAiClient::new(OpenAiSettings {
        api_key: cfg.openai.api_key.clone(),
        organization: cfg.openai.organization().map(str::to_string),
        model: cfg.openai.model.clone(),
        temperature: cfg.openai.temperature,
        endpoint: cfg.openai.endpoint.clone(),
        timeout: Some(cfg.http.timeout()),
        retries: cfg.http.retries,
    })
    .context("failed to build openai client")?;

    info!(
        model = %cfg.openai.model,
        temperature = cfg.openai.temperature,
        org_configured = cfg.openai.organization().is_some(),
        timeout_secs = cfg.http.timeout_secs,
        retries = cfg.http.retries,
        "clients ready"
    );

    Ok(EventPipeline::new(
        Arc::new(twitter),
        EventExtractor::new(Arc::new(openai)),
    ))
}

/// Bind `cfg.server.bind` and serve until SIGINT/SIGTERM.
pub async fn serve(cfg: &ServiceConfig) -> anyhow::Result<()> {
    let state = AppState::new(build_pipeline(cfg)?);

    let listener = TcpListener::bind(cfg.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}
