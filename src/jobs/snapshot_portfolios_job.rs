//! Daily portfolio snapshots.
//!
//! Runs after market close and writes one rollup row per child account:
//! holdings valued at the latest cached prices, plus cash. The
//! (account, date) unique key means an account already snapshotted today is
//! skipped, so the job can be re-run safely.

use crate::db;
use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::portfolio_service::{self, SnapshotOutcome};
use chrono::Utc;
use tracing::{info, warn};

pub async fn snapshot_all_portfolios(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("📸 Snapshotting all portfolios...");

    let today = Utc::now().date_naive();
    let accounts = db::account_queries::fetch_all(ctx.pool.as_ref()).await?;

    if accounts.is_empty() {
        info!("No accounts to snapshot");
        return Ok(JobResult {
            items_processed: 0,
            items_failed: 0,
        });
    }

    let mut processed = 0;
    let mut failed = 0;

    for account in &accounts {
        match portfolio_service::snapshot_account(ctx.pool.as_ref(), account, today).await {
            Ok(SnapshotOutcome::Created(total_value)) => {
                processed += 1;
                info!(
                    "✅ Snapshot for {} ({}): total value {}",
                    account.first_name, account.id, total_value
                );
            }
            Ok(SnapshotOutcome::Skipped) => {
                processed += 1;
                info!(
                    "✓ {} already snapshotted for {}",
                    account.first_name, today
                );
            }
            Err(e) => {
                failed += 1;
                warn!(
                    "❌ Failed to snapshot account {}: {}",
                    account.id, e
                );
            }
        }
    }

    Ok(JobResult {
        items_processed: processed,
        items_failed: failed,
    })
}
