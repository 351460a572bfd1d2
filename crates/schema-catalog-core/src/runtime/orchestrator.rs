// crates/schema-catalog-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Sync Orchestrator
// Description: Top-level driver for one catalog synchronization run.
// Purpose: List subjects, reconcile removals, and fan out bounded workers.
// Dependencies: tokio, tracing, crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! A run proceeds in three phases:
//!
//! 1. list the registry's subjects under the long deadline; failure here
//!    aborts the run,
//! 2. remove stale subjects (committed before any worker starts),
//! 3. sync each registry subject with at most `max_concurrent` workers in
//!    flight.
//!
//! Worker outcomes are folded into [`SyncMetrics`]; no failure escapes
//! [`SyncOrchestrator::sync_all`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use tracing::debug;
use tracing::debug_span;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::core::Lookup;
use crate::core::SyncCounters;
use crate::core::SyncMetrics;
use crate::interfaces::CatalogStore;
use crate::interfaces::SchemaRegistryClient;
use crate::interfaces::StoreError;
use crate::runtime::gateway::GatewayConfig;
use crate::runtime::gateway::RegistryGateway;
use crate::runtime::reconciler::StaleEntryReconciler;
use crate::runtime::worker::SubjectOutcome;
use crate::runtime::worker::SubjectSyncWorker;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Default number of subjects synced concurrently.
pub const DEFAULT_MAX_CONCURRENT: usize = 15;

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum subject workers in flight.
    pub max_concurrent: usize,
    /// Registry timeout and retry policy.
    pub gateway: GatewayConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            gateway: GatewayConfig::default(),
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives full catalog synchronization runs.
#[derive(Clone)]
pub struct SyncOrchestrator {
    /// Registry gateway shared by all workers.
    gateway: RegistryGateway,
    /// Local catalog store.
    store: Arc<dyn CatalogStore>,
    /// Maximum subject workers in flight.
    max_concurrent: usize,
}

impl SyncOrchestrator {
    /// Creates an orchestrator from injected collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn SchemaRegistryClient>,
        store: Arc<dyn CatalogStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            gateway: RegistryGateway::new(client, config.gateway),
            store,
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    /// Runs one synchronization pass and returns its metrics.
    pub async fn sync_all(&self) -> SyncMetrics {
        let started = Instant::now();
        let counters = Arc::new(SyncCounters::new());
        let mut metrics = SyncMetrics::default();

        let registry_subjects: BTreeSet<String> = match self.gateway.list_subjects().await {
            Lookup::Found(subjects) => subjects.into_iter().collect(),
            Lookup::NotFound | Lookup::Unavailable => {
                error!("registry subject list unavailable; aborting sync run");
                counters.record_error();
                return finish(metrics, &counters, started);
            }
        };
        counters.add_subjects_seen(u64::try_from(registry_subjects.len()).unwrap_or(u64::MAX));

        let reconciler = StaleEntryReconciler::new(Arc::clone(&self.store));
        let listed = registry_subjects.clone();
        let reconciled = match tokio::task::spawn_blocking(move || reconciler.reconcile(&listed))
            .await
        {
            Ok(result) => result,
            Err(err) => Err(StoreError::Store(format!("reconcile task join failed: {err}"))),
        };
        match reconciled {
            Ok(report) => {
                metrics.subjects_removed =
                    u64::try_from(report.removed_subjects.len()).unwrap_or(u64::MAX);
                metrics.versions_removed = report.versions_removed;
                metrics.artifacts_removed = report.artifacts_removed;
                metrics.metadata_removed = report.metadata_removed;
                metrics.removed_subjects = report.removed_subjects;
            }
            Err(err) => {
                error!(error = %err, "stale subject reconciliation failed");
                counters.record_error();
            }
        }

        self.fan_out(&registry_subjects, &counters).await;
        finish(metrics, &counters, started)
    }

    /// Syncs every subject with bounded concurrency and folds the outcomes.
    async fn fan_out(&self, subjects: &BTreeSet<String>, counters: &Arc<SyncCounters>) {
        let limiter = Arc::new(Semaphore::new(self.max_concurrent));
        let worker =
            SubjectSyncWorker::new(self.gateway.clone(), Arc::clone(&self.store), Arc::clone(counters));
        let mut tasks = JoinSet::new();
        for subject in subjects {
            let Ok(permit) = Arc::clone(&limiter).acquire_owned().await else {
                error!("concurrency limiter closed; stopping fan-out");
                counters.record_error();
                break;
            };
            let worker = worker.clone();
            let subject = subject.clone();
            let span = debug_span!("sync_subject", subject = %subject);
            tasks.spawn(
                async move {
                    let outcome = worker.sync_subject(&subject).await;
                    drop(permit);
                    (subject, outcome)
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((subject, outcome)) => fold_outcome(&subject, outcome, counters),
                Err(err) => {
                    error!(error = %err, "subject sync task aborted");
                    counters.record_error();
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Folds one worker outcome into the run counters.
fn fold_outcome(subject: &str, outcome: SubjectOutcome, counters: &SyncCounters) {
    match outcome {
        SubjectOutcome::Synced {
            versions_new,
            created,
        } => {
            if created {
                counters.record_subject_new();
            }
            debug!(subject, versions_new, created, "subject synced");
        }
        SubjectOutcome::Interrupted {
            versions_new,
            created,
            missing_version,
        } => {
            if created {
                counters.record_subject_new();
            }
            warn!(subject, versions_new, missing_version, "subject catch-up stopped at gap");
            counters.record_error();
        }
        SubjectOutcome::Skipped(reason) => {
            debug!(subject, reason = reason.as_str(), "subject skipped");
        }
        SubjectOutcome::Failed(reason) => {
            warn!(subject, reason = %reason, "subject sync failed");
            counters.record_error();
        }
    }
}

/// Completes the metrics report for a run.
fn finish(mut metrics: SyncMetrics, counters: &SyncCounters, started: Instant) -> SyncMetrics {
    counters.snapshot_into(&mut metrics);
    metrics.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        subjects_seen = metrics.subjects_seen,
        subjects_new = metrics.subjects_new,
        subjects_removed = metrics.subjects_removed,
        versions_new = metrics.versions_new,
        errors = metrics.errors,
        duration_ms = metrics.duration_ms,
        "catalog sync run finished"
    );
    metrics
}
