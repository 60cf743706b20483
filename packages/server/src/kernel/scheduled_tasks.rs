//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The offer dispatch tick runs on a schedule (every minute by default):
//! for each favr currently holding a `next_to_send` offer it re-enters the
//! sequencer, which delivers to the active candidate and promotes the next
//! one in line.
//!
//! ```text
//! Scheduler (every minute)
//!     │
//!     └─► favrs_with_next_to_send()
//!             └─► For each favr → sequencer::dispatch_next(favr_id)
//! ```

use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::offers::models::Offer;
use crate::domains::offers::sequencer;
use crate::kernel::ServerDeps;

/// Session directory housekeeping cadence (every 5 minutes).
const SESSION_CLEANUP_SCHEDULE: &str = "0 */5 * * * *";

/// Start all scheduled tasks
pub async fn start_scheduler(deps: Arc<ServerDeps>, schedule: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let tick_deps = deps.clone();
    let dispatch_job = Job::new_async(schedule, move |_uuid, _lock| {
        let deps = tick_deps.clone();
        Box::pin(async move {
            if let Err(e) = run_dispatch_tick(&deps).await {
                tracing::error!("Offer dispatch tick failed: {}", e);
            }
        })
    })?;

    scheduler.add(dispatch_job).await?;

    // Disconnected SSE clients leave dead entries in the session directory;
    // sweep them out on an interval.
    let cleanup_deps = deps.clone();
    let session_cleanup_job = Job::new_async(SESSION_CLEANUP_SCHEDULE, move |_uuid, _lock| {
        let deps = cleanup_deps.clone();
        Box::pin(async move {
            deps.sessions.cleanup().await;
        })
    })?;
    scheduler.add(session_cleanup_job).await?;

    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (offer dispatch tick: {})", schedule);
    Ok(scheduler)
}

/// Run one offer dispatch cycle across all favrs with an active candidate.
///
/// A failure for one favr does not stop the sweep over the others.
pub async fn run_dispatch_tick(deps: &ServerDeps) -> Result<()> {
    let favr_ids = Offer::favrs_with_next_to_send(&deps.db_pool).await?;

    if favr_ids.is_empty() {
        return Ok(());
    }

    tracing::info!("Dispatch tick: {} favr(s) with an active offer", favr_ids.len());

    for favr_id in favr_ids {
        if let Err(e) = sequencer::dispatch_next(favr_id, deps).await {
            tracing::error!(favr_id = %favr_id, "Dispatch failed: {}", e);
        }
    }

    Ok(())
}
