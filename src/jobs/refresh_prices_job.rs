//! Daily price refresh.
//!
//! Runs before market open and ingests the previous session's close for
//! every active stock, going through the same `price_service::refresh_latest`
//! path a manual refresh uses. The (stock, date) unique key makes re-runs
//! no-ops (`Skipped`), and the rate limiter spaces provider calls so a large
//! stock list stays inside the free tier.

use crate::db;
use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::price_service::{self, RefreshOutcome};
use tracing::{info, warn};

pub async fn refresh_all_prices(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("💰 Refreshing prices for all active stocks...");

    let stocks = db::stock_queries::fetch_active(ctx.pool.as_ref()).await?;

    if stocks.is_empty() {
        info!("No active stocks to refresh");
        return Ok(JobResult {
            items_processed: 0,
            items_failed: 0,
        });
    }

    let mut processed = 0;
    let mut failed = 0;

    for stock in &stocks {
        let _guard = ctx.rate_limiter.acquire().await;

        match price_service::refresh_latest(
            ctx.pool.as_ref(),
            ctx.price_provider.as_ref(),
            ctx.failure_cache.as_ref(),
            stock,
        )
        .await
        {
            Ok(RefreshOutcome::Updated(price)) => {
                processed += 1;
                info!("✅ {} updated at {}", stock.ticker, price);
            }
            Ok(RefreshOutcome::Skipped) => {
                processed += 1;
                info!("✓ {} already has today's observation", stock.ticker);
            }
            Err(e) => {
                failed += 1;
                warn!("❌ Failed to refresh {}: {}", stock.ticker, e);
            }
        }
    }

    Ok(JobResult {
        items_processed: processed,
        items_failed: failed,
    })
}
