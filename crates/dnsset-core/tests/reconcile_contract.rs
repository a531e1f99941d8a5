//! Contract Test: Record Reconciliation
//!
//! Constraints verified:
//! - A missing record is created exactly once
//! - Matching records are never written
//! - Only divergent records are updated, each independently
//! - The TTL is normalized once and submitted in normalized form
//! - The proxy flag is only compared and sent when the provider supports it
//! - A failing zone lookup stops the unit before any record call

mod common;

use common::*;
use dnsset_core::reconcile::{Outcome, ReconcileOptions, RecordReconciler};
use dnsset_core::record::{DesiredState, RecordType};
use dnsset_core::Error;
use std::sync::Arc;

fn desired(name: &str, record_type: RecordType, ip: &str, ttl: Option<u32>, proxied: bool) -> DesiredState {
    DesiredState::new(domain(name), record_type, ip.parse().unwrap(), ttl, proxied).unwrap()
}

fn reconciler(provider: &Arc<MockDnsProvider>) -> RecordReconciler {
    RecordReconciler::new(provider.clone())
}

#[tokio::test]
async fn missing_record_is_created() {
    let provider = Arc::new(MockDnsProvider::new().with_zone("z1", "example.com"));

    let outcome = reconciler(&provider)
        .reconcile(&desired("www.example.com", RecordType::A, "203.0.113.7", Some(300), false))
        .await;

    assert!(matches!(outcome, Outcome::Created));
    assert_eq!(
        provider.calls(),
        vec![
            Call::FindZones("example.com".to_string()),
            Call::ListRecords {
                zone_id: "z1".to_string(),
                name: "www.example.com".to_string(),
                record_type: Some(RecordType::A),
            },
            Call::Create {
                zone_id: "z1".to_string(),
                request: dnsset_core::RecordRequest {
                    name: "www.example.com".to_string(),
                    record_type: RecordType::A,
                    content: "203.0.113.7".to_string(),
                    ttl: 300,
                    proxied: Some(false),
                },
            },
        ]
    );
}

#[tokio::test]
async fn matching_record_is_not_written() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 1, true),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, true))
        .await;

    assert!(matches!(outcome, Outcome::NoOpMatchedAll));
    assert!(provider.writes().is_empty());
}

#[tokio::test]
async fn second_pass_is_a_no_op() {
    let provider = Arc::new(MockDnsProvider::new().with_zone("z1", "example.com"));
    let reconciler = reconciler(&provider);
    let target = desired("api.example.com", RecordType::A, "198.51.100.4", Some(0), false);

    assert!(matches!(reconciler.reconcile(&target).await, Outcome::Created));
    assert!(matches!(reconciler.reconcile(&target).await, Outcome::NoOpMatchedAll));
    assert_eq!(provider.writes().len(), 1);
}

#[tokio::test]
async fn divergent_content_is_updated() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "192.0.2.1", 1, false),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, false))
        .await;

    assert!(matches!(outcome, Outcome::Updated(1)));
    let records = provider.records("example.com");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "203.0.113.7");
}

#[tokio::test]
async fn every_divergent_duplicate_is_updated() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "192.0.2.1", 1, false)
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 1, false)
            .with_record("z1", "example.com", RecordType::A, "192.0.2.2", 1, false),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, false))
        .await;

    assert!(matches!(outcome, Outcome::Updated(2)));
    let updated: Vec<String> = provider
        .writes()
        .into_iter()
        .filter_map(|call| match call {
            Call::Update { record_id, .. } => Some(record_id),
            _ => None,
        })
        .collect();
    assert_eq!(updated, vec!["seed-1", "seed-3"]);
}

#[tokio::test]
async fn proxy_flag_difference_triggers_update() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 1, false),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, true))
        .await;

    assert!(matches!(outcome, Outcome::Updated(1)));
    assert!(provider.records("example.com")[0].proxied);
}

#[tokio::test]
async fn proxy_flag_ignored_without_provider_support() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .without_proxy_support()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "192.0.2.1", 1, false),
    );
    let reconciler = reconciler(&provider);

    let outcome = reconciler
        .reconcile(&desired("example.com", RecordType::A, "192.0.2.1", None, true))
        .await;
    assert!(matches!(outcome, Outcome::NoOpMatchedAll));

    let outcome = reconciler
        .reconcile(&desired("example.com", RecordType::A, "192.0.2.9", None, true))
        .await;
    assert!(matches!(outcome, Outcome::Updated(1)));
    match &provider.writes()[0] {
        Call::Update { request, .. } => assert_eq!(request.proxied, None),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn ttl_drift_ignored_by_default() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 3600, false),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", Some(300), false))
        .await;

    assert!(matches!(outcome, Outcome::NoOpMatchedAll));
}

#[tokio::test]
async fn ttl_drift_updates_when_enabled() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 3600, false)
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 1, false),
    );
    let reconciler = reconciler(&provider).with_options(ReconcileOptions {
        ttl_drift_triggers_update: true,
    });

    // Automatic TTL normalizes to 1, so only the 3600 record drifts
    let outcome = reconciler
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", Some(0), false))
        .await;

    assert!(matches!(outcome, Outcome::Updated(1)));
    assert!(provider.records("example.com").iter().all(|r| r.ttl == 1));
}

#[tokio::test]
async fn stored_zero_ttl_counts_as_automatic() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::A, "203.0.113.7", 0, false),
    );
    let reconciler = reconciler(&provider).with_options(ReconcileOptions {
        ttl_drift_triggers_update: true,
    });

    let outcome = reconciler
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, false))
        .await;

    assert!(matches!(outcome, Outcome::NoOpMatchedAll));
    assert!(provider.writes().is_empty());
}

#[tokio::test]
async fn automatic_ttl_is_submitted_normalized() {
    for ttl in [None, Some(0)] {
        let provider = Arc::new(MockDnsProvider::new().with_zone("z1", "example.com"));
        reconciler(&provider)
            .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", ttl, false))
            .await;

        match &provider.writes()[0] {
            Call::Create { request, .. } => assert_eq!(request.ttl, 1),
            other => panic!("unexpected call {other:?}"),
        }
    }
}

#[tokio::test]
async fn ipv6_content_compared_as_address() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::Aaaa, "2001:0DB8:0:0::1", 1, false),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::Aaaa, "2001:db8::1", None, false))
        .await;

    assert!(matches!(outcome, Outcome::NoOpMatchedAll));
}

#[tokio::test]
async fn other_record_type_is_left_alone() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .with_record("z1", "example.com", RecordType::Aaaa, "2001:db8::1", 1, false),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, false))
        .await;

    assert!(matches!(outcome, Outcome::Created));
    assert_eq!(provider.records("example.com").len(), 2);
}

#[tokio::test]
async fn unknown_zone_fails_before_listing() {
    let provider = Arc::new(MockDnsProvider::new().with_zone("z1", "example.com"));

    let outcome = reconciler(&provider)
        .reconcile(&desired("www.example.org", RecordType::A, "203.0.113.7", None, false))
        .await;

    match outcome {
        Outcome::Failed(Error::ZoneNotFound { domain }) => assert_eq!(domain, "www.example.org"),
        other => panic!("expected ZoneNotFound, got {other:?}"),
    }
    assert_eq!(provider.calls(), vec![Call::FindZones("example.org".to_string())]);
}

#[tokio::test]
async fn provider_failure_is_reported() {
    let provider = Arc::new(
        MockDnsProvider::new()
            .with_zone("z1", "example.com")
            .failing_for("example.com"),
    );

    let outcome = reconciler(&provider)
        .reconcile(&desired("example.com", RecordType::A, "203.0.113.7", None, false))
        .await;

    assert!(matches!(outcome, Outcome::Failed(Error::Transport(_))));
    assert!(!outcome.is_success());
    assert!(provider.writes().is_empty());
}
