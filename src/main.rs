//! AI News Curator — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the store, oracles, feed registry,
//! notifier, and routes.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_news_curator::api::{self, AppState};
use ai_news_curator::config::AppConfig;
use ai_news_curator::curate::Curator;
use ai_news_curator::feeds;
use ai_news_curator::metrics::Metrics;
use ai_news_curator::notify::SlackNotifier;
use ai_news_curator::oracle::{
    DynPrimarySourceOracle, DynRelevanceOracle, DynSummaryOracle, DynThreadOracle, OpenAiOracle,
};
use ai_news_curator::store::{DynArticleStore, JsonFileStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();
    let metrics = Metrics::init(cfg.window_hours);

    let oracle = Arc::new(OpenAiOracle::from_env());
    if !oracle.is_configured() {
        warn!("OPENAI_API_KEY not set; oracle calls will fail closed and nothing will be curated");
    }

    let store: DynArticleStore = Arc::new(JsonFileStore::open(&cfg.store_path)?);

    let feed_specs = match feeds::load_feeds_default() {
        Ok(specs) => specs,
        Err(e) => {
            warn!(error = ?e, "feed registry failed to load; collect will check zero feeds");
            Vec::new()
        }
    };
    info!(feeds = feed_specs.len(), "feed registry loaded");
    let providers = Arc::new(feeds::providers_from_specs(feed_specs));

    let relevance: DynRelevanceOracle = oracle.clone();
    let summarizer: DynSummaryOracle = oracle.clone();
    let thread: DynThreadOracle = oracle.clone();
    let primary_source: DynPrimarySourceOracle = oracle;

    let curator = Arc::new(Curator::new(
        relevance,
        summarizer,
        thread,
        primary_source,
        store,
        cfg.curator(),
    ));

    let state = AppState::new(curator, providers, Arc::new(SlackNotifier::from_env()));
    let app = api::create_router(state).merge(metrics.router());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
