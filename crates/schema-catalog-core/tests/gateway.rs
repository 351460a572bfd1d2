// crates/schema-catalog-core/tests/gateway.rs
// ============================================================================
// Module: Registry Gateway Tests
// Description: Deadline, retry, and backoff behavior of registry calls.
// ============================================================================
//! ## Overview
//! Runs the gateway against a scriptable registry on a paused clock so
//! timeouts and backoff delays are observed exactly.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::time::Duration;

use common::FakeRegistry;
use schema_catalog_core::GatewayConfig;
use schema_catalog_core::Lookup;
use schema_catalog_core::RegistryGateway;
use schema_catalog_core::SubjectMode;

fn fast_config(max_retries: u32) -> GatewayConfig {
    GatewayConfig {
        request_timeout: Duration::from_millis(100),
        max_retries,
        retry_base_delay: Duration::from_millis(50),
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

#[test]
fn backoff_doubles_per_attempt() {
    let config = GatewayConfig::default();
    assert_eq!(config.backoff_delay(0), Duration::from_millis(500));
    assert_eq!(config.backoff_delay(1), Duration::from_millis(1000));
    assert_eq!(config.backoff_delay(2), Duration::from_millis(2000));
}

#[test]
fn backoff_saturates_instead_of_overflowing() {
    let config = GatewayConfig::default();
    assert!(config.backoff_delay(64) >= config.backoff_delay(31));
}

#[test]
fn listing_deadline_is_twice_the_request_deadline() {
    let config = GatewayConfig::default();
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.list_timeout(), Duration::from_secs(20));
    assert_eq!(config.max_retries, 3);
}

// ============================================================================
// SECTION: Retry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn latest_lookup_retries_timeouts_with_growing_gaps() {
    let registry = FakeRegistry::new();
    registry.put_versions("orders-value", 1);
    registry.hang_latest("orders-value");
    let gateway = RegistryGateway::new(registry.clone(), fast_config(3));

    let lookup = gateway.get_latest_version_with_retry("orders-value").await;

    assert_eq!(lookup, Lookup::Unavailable);
    let calls = registry.latest_calls("orders-value");
    assert_eq!(calls.len(), 3);
    let first_gap = calls[1] - calls[0];
    let second_gap = calls[2] - calls[1];
    assert!(first_gap >= Duration::from_millis(150));
    assert!(second_gap > first_gap);
}

#[tokio::test(start_paused = true)]
async fn latest_lookup_stops_on_not_found() {
    let registry = FakeRegistry::new();
    let gateway = RegistryGateway::new(registry.clone(), fast_config(5));

    let lookup = gateway.get_latest_version_with_retry("missing-value").await;

    assert_eq!(lookup, Lookup::NotFound);
    assert_eq!(registry.latest_calls("missing-value").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_retries_still_makes_one_attempt() {
    let registry = FakeRegistry::new();
    registry.put_versions("orders-value", 2);
    let gateway = RegistryGateway::new(registry.clone(), fast_config(0));

    let schema = gateway.get_latest_version_with_retry("orders-value").await.found().unwrap();

    assert_eq!(schema.version, 2);
    assert_eq!(registry.latest_calls("orders-value").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_lookup_does_not_retry() {
    let registry = FakeRegistry::new();
    registry.put_versions("orders-value", 1);
    registry.hang_latest("orders-value");
    let gateway = RegistryGateway::new(registry.clone(), fast_config(3));

    assert_eq!(gateway.get_latest_version("orders-value").await, Lookup::Unavailable);
    assert_eq!(registry.latest_calls("orders-value").len(), 1);
}

// ============================================================================
// SECTION: Other Calls
// ============================================================================

#[tokio::test]
async fn listing_failure_is_unavailable() {
    let registry = FakeRegistry::new();
    registry.put_versions("orders-value", 1);
    registry.fail_listing();
    let gateway = RegistryGateway::new(registry, fast_config(3));

    assert_eq!(gateway.list_subjects().await, Lookup::Unavailable);
}

#[tokio::test]
async fn missing_version_is_not_found() {
    let registry = FakeRegistry::new();
    registry.put_versions("orders-value", 1);
    let gateway = RegistryGateway::new(registry, fast_config(3));

    assert_eq!(gateway.get_version("orders-value", 9).await, Lookup::NotFound);
    assert!(gateway.get_version("orders-value", 1).await.found().is_some());
}

#[tokio::test]
async fn config_and_mode_failures_collapse_to_none() {
    let registry = FakeRegistry::new();
    registry.set_config("orders-value", "FULL");
    registry.set_mode("orders-value", "READONLY");
    let gateway = RegistryGateway::new(registry.clone(), fast_config(3));

    let config = gateway.get_config("orders-value").await.unwrap();
    assert_eq!(config.compatibility_level.as_deref(), Some("FULL"));
    assert_eq!(gateway.get_mode("orders-value").await, Some(SubjectMode::ReadOnly));
    assert_eq!(gateway.get_mode("other-value").await, None);

    registry.fail_config(true);
    assert_eq!(gateway.get_config("orders-value").await, None);
}
