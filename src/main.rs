use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use kidfolio_backend::app;
use kidfolio_backend::config::TradingPolicy;
use kidfolio_backend::external::finnhub::FinnhubProvider;
use kidfolio_backend::external::price_provider::PriceProvider;
use kidfolio_backend::logging::{init_logging, LoggingConfig};
use kidfolio_backend::services::failure_cache::FailureCache;
use kidfolio_backend::services::job_scheduler_service::JobSchedulerService;
use kidfolio_backend::services::rate_limiter::RateLimiter;
use kidfolio_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let provider: Arc<dyn PriceProvider> = Arc::new(
        FinnhubProvider::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to create FinnhubProvider: {}", e))?,
    );
    tracing::info!("📊 Using price provider: Finnhub");

    let failure_cache = FailureCache::new();
    // Finnhub free tier: 60 requests/minute
    let rate_limiter = Arc::new(RateLimiter::new(3, 60));

    let mut scheduler = JobSchedulerService::new(
        Arc::new(pool.clone()),
        provider.clone(),
        Arc::new(failure_cache.clone()),
        rate_limiter.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create job scheduler: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start job scheduler: {}", e))?;

    let state = AppState {
        pool,
        price_provider: provider,
        failure_cache,
        rate_limiter,
        policy: TradingPolicy::from_env(),
    };
    let app = app::create_app(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Kidfolio backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
