// crates/schema-catalog-cli/src/schedule.rs
// ============================================================================
// Module: Periodic Sync Scheduler
// Description: Runs sync passes on a fixed interval until shutdown.
// Purpose: Back the `serve` command with a cancellable run loop.
// Dependencies: schema-catalog-core, tokio, tracing
// ============================================================================

//! ## Overview
//! The first pass starts immediately. Later passes start one interval after
//! the previous pass began, or as soon as it finishes when a pass overruns
//! the interval. Shutdown is only observed between passes so an in-flight
//! run always completes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use schema_catalog_core::SyncOrchestrator;
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Runs `sync_all` every `interval` until `shutdown` resolves.
///
/// Returns the number of completed passes.
pub async fn run_periodic<F>(orchestrator: &SyncOrchestrator, interval: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    let mut completed: u64 = 0;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        let metrics = orchestrator.sync_all().await;
        completed = completed.saturating_add(1);
        if metrics.errors > 0 {
            warn!(run = completed, errors = metrics.errors, "sync run finished with errors");
        }
        info!(
            run = completed,
            subjects_seen = metrics.subjects_seen,
            versions_new = metrics.versions_new,
            subjects_removed = metrics.subjects_removed,
            duration_ms = metrics.duration_ms,
            "scheduled sync run complete"
        );
    }
    info!(runs = completed, "scheduler stopped");
    completed
}
