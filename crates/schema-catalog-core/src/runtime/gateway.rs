// crates/schema-catalog-core/src/runtime/gateway.rs
// ============================================================================
// Module: Registry Gateway
// Description: Deadline and retry policy around schema registry calls.
// Purpose: Turn registry calls into tagged lookups that never raise.
// Dependencies: tokio, tracing, crate::interfaces
// ============================================================================

//! ## Overview
//! Every registry call is bounded by the configured request timeout; the
//! subject listing gets twice that because it covers the whole catalog.
//! Only the high-water-mark lookup retries, and only on timeout, with
//! exponential backoff (`base * 2^attempt`). A registry "not found" is
//! terminal. Any other failure yields [`Lookup::Unavailable`] (or `None`)
//! so the orchestrator can carry on with other subjects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::core::Lookup;
use crate::core::RegisteredSchema;
use crate::core::SubjectConfig;
use crate::core::SubjectMode;
use crate::interfaces::RegistryError;
use crate::interfaces::SchemaRegistryClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-call timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default number of high-water-mark lookup attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: Config
// ============================================================================

/// Timeout and retry policy for registry calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Deadline applied to each registry call.
    pub request_timeout: Duration,
    /// Attempts made by the high-water-mark lookup (at least one).
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts.
    pub retry_base_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl GatewayConfig {
    /// Deadline for the catalog-wide subject listing.
    #[must_use]
    pub const fn list_timeout(&self) -> Duration {
        self.request_timeout.saturating_mul(2)
    }

    /// Backoff delay after the given zero-based failed attempt.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_base_delay.saturating_mul(factor)
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Outcome of a single deadline-bounded call.
enum Attempt<T> {
    /// Call completed successfully.
    Done(T),
    /// Deadline elapsed.
    TimedOut,
    /// Registry returned an error.
    Failed(RegistryError),
}

/// Registry wrapper applying the engine's timeout and retry policy.
#[derive(Clone)]
pub struct RegistryGateway {
    /// Underlying registry client.
    client: Arc<dyn SchemaRegistryClient>,
    /// Timeout and retry policy.
    config: GatewayConfig,
}

impl RegistryGateway {
    /// Creates a gateway around a registry client.
    #[must_use]
    pub fn new(client: Arc<dyn SchemaRegistryClient>, config: GatewayConfig) -> Self {
        Self {
            client,
            config,
        }
    }

    /// Lists all registry subjects under the long deadline.
    pub async fn list_subjects(&self) -> Lookup<Vec<String>> {
        match bounded(self.config.list_timeout(), self.client.list_subjects()).await {
            Attempt::Done(subjects) => Lookup::Found(subjects),
            Attempt::TimedOut => {
                warn!(timeout_ms = millis(self.config.list_timeout()), "subject listing timed out");
                Lookup::Unavailable
            }
            Attempt::Failed(err) => {
                warn!(error = %err, "subject listing failed");
                Lookup::Unavailable
            }
        }
    }

    /// Fetches the latest version of a subject with a single attempt.
    pub async fn get_latest_version(&self, subject: &str) -> Lookup<RegisteredSchema> {
        let call = self.client.get_latest_version(subject);
        schema_lookup(subject, None, bounded(self.config.request_timeout, call).await)
    }

    /// Fetches the latest version of a subject, retrying on timeout.
    ///
    /// Makes at most `max_retries` attempts; a not-found answer or any
    /// non-timeout failure ends the loop immediately.
    pub async fn get_latest_version_with_retry(&self, subject: &str) -> Lookup<RegisteredSchema> {
        let attempts = self.config.max_retries.max(1);
        for attempt in 0..attempts {
            let call = self.client.get_latest_version(subject);
            match bounded(self.config.request_timeout, call).await {
                Attempt::TimedOut => {
                    if attempt + 1 < attempts {
                        let delay = self.config.backoff_delay(attempt);
                        warn!(
                            subject,
                            attempt = attempt + 1,
                            delay_ms = millis(delay),
                            "latest version lookup timed out; retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                other => return schema_lookup(subject, None, other),
            }
        }
        warn!(subject, attempts, "latest version lookup exhausted retries");
        Lookup::Unavailable
    }

    /// Fetches one version of a subject with a single attempt.
    pub async fn get_version(&self, subject: &str, version: u32) -> Lookup<RegisteredSchema> {
        let call = self.client.get_version(subject, version);
        schema_lookup(subject, Some(version), bounded(self.config.request_timeout, call).await)
    }

    /// Fetches the subject's compatibility configuration; `None` on any failure.
    pub async fn get_config(&self, subject: &str) -> Option<SubjectConfig> {
        match bounded(self.config.request_timeout, self.client.get_config(subject)).await {
            Attempt::Done(config) => config,
            Attempt::TimedOut => {
                debug!(subject, "config lookup timed out");
                None
            }
            Attempt::Failed(err) => {
                debug!(subject, error = %err, "config lookup failed");
                None
            }
        }
    }

    /// Fetches the subject's write mode; `None` on any failure or when the
    /// registry does not support modes.
    pub async fn get_mode(&self, subject: &str) -> Option<SubjectMode> {
        match bounded(self.config.request_timeout, self.client.get_mode(subject)).await {
            Attempt::Done(mode) => Some(mode),
            Attempt::TimedOut => {
                debug!(subject, "mode lookup timed out");
                None
            }
            Attempt::Failed(err) => {
                debug!(subject, error = %err, "mode lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a registry call under a deadline.
async fn bounded<T, F>(timeout: Duration, call: F) -> Attempt<T>
where
    F: Future<Output = Result<T, RegistryError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Attempt::Done(value),
        Ok(Err(err)) => Attempt::Failed(err),
        Err(_) => Attempt::TimedOut,
    }
}

/// Maps a schema fetch attempt into a lookup.
fn schema_lookup(
    subject: &str,
    version: Option<u32>,
    attempt: Attempt<RegisteredSchema>,
) -> Lookup<RegisteredSchema> {
    match attempt {
        Attempt::Done(schema) => Lookup::Found(schema),
        Attempt::Failed(RegistryError::NotFound(_)) => {
            debug!(subject, version, "registry reports schema not found");
            Lookup::NotFound
        }
        Attempt::Failed(err) => {
            warn!(subject, version, error = %err, "schema fetch failed");
            Lookup::Unavailable
        }
        Attempt::TimedOut => {
            warn!(subject, version, "schema fetch timed out");
            Lookup::Unavailable
        }
    }
}

/// Converts a duration to whole milliseconds for logging.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
