use fx_newscaster::agents::NewscasterAgent;
use fx_newscaster::config::{AppConfig, Credentials, DeliveryMode};
use fx_newscaster::llm::LLMClient;
use fx_newscaster::news::{NewsFetcher, TavilyClient};
use fx_newscaster::services::{NewsCycle, Summarizer};
use fx_newscaster::transport::{broadcast, ClientRegistry, OneShotSender};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    // Load Configuration
    let config = AppConfig::load()?;
    let credentials = Credentials::from_env()?;
    info!("=== FX News Caster ({:?} mode) ===", config.mode);
    info!("Model: {} | LLM keys: {}", config.llm.model, credentials.llm_keys.len());

    if credentials.search_key.is_none() {
        warn!("⚠️ TAVILY_API_KEY not set - every search will fail until it is provided");
    }

    let fetcher = NewsFetcher::new(
        Arc::new(TavilyClient::from_config(&config.search, credentials.search_key.clone())),
        config.target_domains(),
    );
    let summarizer = Summarizer::new(
        Arc::new(LLMClient::from_config(&config.llm)),
        credentials.llm_keys,
        NewscasterAgent::new(config.persona_name.clone()),
    );
    let base_query = config.search.base_query.clone();
    let interval = config.cycle_interval();

    match config.mode {
        DeliveryMode::Oneshot => {
            let sender = OneShotSender::new(config.oneshot.url.clone());
            info!("Target: {}", sender.url());

            if let Some(greeting) = &config.oneshot.startup_greeting {
                if let Err(e) = sender.greet(greeting).await {
                    warn!("⚠️ Startup greeting not delivered: {}", e);
                }
            }

            let cycle = NewsCycle::new(fetcher, summarizer, Arc::new(sender), base_query, interval);
            tokio::select! {
                _ = cycle.run() => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
            }
        }
        DeliveryMode::Broadcast => {
            let registry = ClientRegistry::new(config.listener_poll());
            let listener =
                tokio::net::TcpListener::bind((config.broadcast.host.as_str(), config.broadcast.port)).await?;
            let app = broadcast::router(registry.clone(), &config.broadcast.path, config.broadcast.greeting.clone());
            let server = tokio::spawn(broadcast::serve(listener, app));

            let cycle = NewsCycle::new(fetcher, summarizer, Arc::new(registry), base_query, interval);
            tokio::select! {
                _ = cycle.run() => {}
                res = server => match res {
                    Ok(Ok(())) => info!("Broadcast server stopped"),
                    Ok(Err(e)) => error!("❌ Broadcast server failed: {}", e),
                    Err(e) => error!("❌ Broadcast server task panicked: {}", e),
                },
                _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
            }
        }
    }

    Ok(())
}
