//! End-to-end probe scenarios against mock checkout endpoints
//!
//! Each scenario stands in for a target system in a particular state: race
//! window open (fresh order per call), serialization fix active (one order
//! total), validation failures, unreachable endpoint, and a stalled endpoint
//! that only ever times out.

use checkout_probe::domain::types::{CheckoutUrl, RequestCount};
use checkout_probe::probe::{
    Classification, PayloadSnapshot, ProbeOrchestrator, TestRunConfig,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn config(endpoint: String, count: u32, timeout: Duration) -> TestRunConfig {
    TestRunConfig::new(
        RequestCount::try_new(count).expect("valid count"),
        CheckoutUrl::try_new(endpoint).expect("valid url"),
        PayloadSnapshot::form(&[
            ("billing_first_name", "Ada"),
            ("billing_last_name", "Lovelace"),
            ("payment_method", "cod"),
        ]),
        timeout,
    )
}

/// Race window open: every concurrent submission creates its own order.
#[tokio::test]
async fn unserialized_target_produces_duplicates() {
    let mut server = mockito::Server::new_async().await;
    let next_order = Arc::new(AtomicU64::new(500));
    server
        .mock("POST", "/checkout")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            let id = next_order.fetch_add(1, Ordering::SeqCst);
            format!(
                "{{\"result\":\"success\",\"redirect\":\"https://shop.test/checkout/order-received/{id}/?key=wc_k\"}}"
            )
            .into_bytes()
        })
        .expect(6)
        .create_async()
        .await;

    let result = ProbeOrchestrator::new()
        .run(&config(
            format!("{}/checkout", server.url()),
            6,
            Duration::from_secs(5),
        ))
        .await;

    assert_eq!(result.classification(), Classification::DuplicatesDetected);
    assert_eq!(result.unique_order_ids().len(), 6);
}

/// Serialization fix active: calls go through a real lock and every caller
/// is handed the same already-created order.
#[tokio::test]
async fn lock_serialized_target_always_classifies_as_fix_working() {
    let mut server = mockito::Server::new_async().await;
    let lock = Arc::new(Mutex::new(()));
    server
        .mock("POST", "/checkout")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            // The critical section a fixed target would hold around its
            // check-then-create sequence
            let _guard = lock.lock().unwrap();
            br#"{"result":"success","order_id":9090}"#.to_vec()
        })
        .expect(8)
        .create_async()
        .await;

    let result = ProbeOrchestrator::new()
        .run(&config(
            format!("{}/checkout", server.url()),
            8,
            Duration::from_secs(5),
        ))
        .await;

    assert_eq!(result.classification(), Classification::FixWorking);
    assert_eq!(result.unique_order_ids().len(), 1);
    assert_eq!(result.outcomes().len(), 8);
}

/// Working lock plus cart validation: the first submission wins the cart,
/// the rest fail with "empty cart" and the run still counts as fixed.
#[tokio::test]
async fn first_caller_wins_and_rest_fail_validation() {
    let mut server = mockito::Server::new_async().await;
    let calls = Arc::new(AtomicU64::new(0));
    server
        .mock("POST", "/checkout")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                br#"{"result":"success","order_id":101}"#.to_vec()
            } else {
                br#"{"result":"failure","messages":"<ul class=\"woocommerce-error\"><li>Your cart is currently empty.</li></ul>"}"#.to_vec()
            }
        })
        .expect(5)
        .create_async()
        .await;

    let result = ProbeOrchestrator::new()
        .run(&config(
            format!("{}/checkout", server.url()),
            5,
            Duration::from_secs(5),
        ))
        .await;

    assert_eq!(result.classification(), Classification::FixWorking);
    assert_eq!(result.unique_order_ids().len(), 1);

    let failures: Vec<_> = result
        .outcomes()
        .iter()
        .filter(|o| !o.is_success())
        .collect();
    assert_eq!(failures.len(), 4);
    for outcome in failures {
        let message = outcome.error().expect("diagnostic recorded");
        assert!(message.as_ref().contains("cart is currently empty"));
        assert!(!message.as_ref().contains('<'));
    }
}

/// Partially failing infrastructure: some calls create orders, some never
/// reach the target. The surviving orders still expose the race.
#[tokio::test]
async fn duplicates_survive_partial_network_failures() {
    let mut server = mockito::Server::new_async().await;
    let calls = Arc::new(AtomicU64::new(0));
    server
        .mock("POST", "/checkout")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => br#"{"order_id":101}"#.to_vec(),
                1 => br#"{"order_id":102}"#.to_vec(),
                2 => br#"{"order_id":103}"#.to_vec(),
                // Unparseable garbage stands in for a dropped connection
                _ => b"".to_vec(),
            }
        })
        .expect(5)
        .create_async()
        .await;

    let result = ProbeOrchestrator::new()
        .run(&config(
            format!("{}/checkout", server.url()),
            5,
            Duration::from_secs(5),
        ))
        .await;

    assert_eq!(result.classification(), Classification::DuplicatesDetected);
    let ids: Vec<u64> = result
        .unique_order_ids()
        .iter()
        .map(|id| id.into_inner())
        .collect();
    assert_eq!(ids, vec![101, 102, 103]);
    assert_eq!(result.outcomes().len(), 5);
}

/// Unreachable endpoint: every outcome is a network failure, none escalate,
/// and the run completes with a full result set.
#[tokio::test]
async fn unreachable_endpoint_yields_no_orders() {
    // Bind then drop to get a port nothing is listening on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = ProbeOrchestrator::new()
        .run(&config(
            format!("http://{addr}/checkout"),
            4,
            Duration::from_secs(2),
        ))
        .await;

    assert_eq!(result.classification(), Classification::NoOrders);
    assert_eq!(result.outcomes().len(), 4);
    for outcome in result.outcomes() {
        assert!(!outcome.is_success());
        assert!(outcome.error().is_some());
    }
}

/// Stalled endpoint: connections are accepted but never answered. Each
/// request fails on its own deadline without delaying its siblings.
#[tokio::test]
async fn stalled_endpoint_times_out_per_request() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let timeout = Duration::from_millis(300);
    let started = std::time::Instant::now();
    let result = ProbeOrchestrator::new()
        .run(&config(format!("http://{addr}/checkout"), 3, timeout))
        .await;

    assert_eq!(result.classification(), Classification::NoOrders);
    for outcome in result.outcomes() {
        let message = outcome.error().expect("timeout recorded");
        assert!(message.as_ref().contains("timed out"));
    }
    // Deadlines ran concurrently, not back to back
    assert!(started.elapsed() < timeout * 3);
}
