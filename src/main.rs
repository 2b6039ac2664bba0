mod api;
mod config;
mod models;
mod services;
mod sources;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use axum::http::{header, HeaderValue, Method};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_rest_router, AppState};
use config::Config;
use services::{AnalyticsCollector, PoolListCache};
use sources::{
    alchemy::AlchemyClient, metrics::HttpMetricsSource, oku::OkuClient, zerox::ZeroXClient,
    RetryPolicy, WalletSource,
};

fn config_path() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[tokio::main(worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wallet_analytics=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = config_path();
    let config = Config::load(&path)?;
    tracing::info!("Configuration loaded from {}", path.display());

    let p = &config.providers;
    let retry = RetryPolicy::new(p.max_retries, p.retry_delay_ms);

    let pools = Arc::new(OkuClient::new(&p.oku_base_url, &p.chain, p.timeout_secs, retry)?);
    let metrics = Arc::new(HttpMetricsSource::new(&p.metrics_base_url, &p.chain, p.timeout_secs, retry)?);

    let wallet: Option<Arc<dyn WalletSource>> = match p.alchemy_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            let client: Arc<dyn WalletSource> =
                Arc::new(AlchemyClient::new(&p.alchemy_base_url, key, p.timeout_secs, retry)?);
            Some(client)
        }
        None => {
            tracing::warn!("ALCHEMY_API_KEY not set, wallet routes disabled");
            None
        }
    };

    let zerox = match ZeroXClient::new(&p.zerox_base_url, p.zerox_api_key.as_deref(), p.timeout_secs, retry) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!("{}, gasless routes disabled", e);
            None
        }
    };

    let cache = Arc::new(PoolListCache::new(config.cache.ttl_secs));
    let collector = Arc::new(AnalyticsCollector::new(
        pools,
        metrics,
        cache.clone(),
        p.metrics_concurrency,
    ));

    // Background: cache cleanup
    let cache_clone = cache.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            cache_clone.cleanup_if_needed();
        }
    });

    let state = Arc::new(AppState {
        collector,
        cache,
        wallet,
        zerox,
        update_interval: config.stream.update_interval,
    });

    let origin: HeaderValue = config.server.cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = create_rest_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
