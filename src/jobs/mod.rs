//! Background jobs executed by the job scheduler outside any user request.
//!
//! Both jobs are idempotent (re-runs are no-ops thanks to the unique keys on
//! price observations and snapshots) and isolate per-item failures: one bad
//! ticker or account never aborts the rest of the batch.

pub mod refresh_prices_job;
pub mod snapshot_portfolios_job;
