//! Tests for the endpoint accessor surface and its locking contract.
//!
//! Concurrency tests use channels with timeouts to observe whether an
//! operation completed while another thread holds the endpoint lock.

use magiknet::{CiliumEndpointUid, Endpoint, EndpointState, Error, IdentifierPrefix};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Long enough that a blocked thread is clearly blocked.
const BLOCKED: Duration = Duration::from_millis(200);

/// Generous bound for an operation expected to complete.
const COMPLETES: Duration = Duration::from_secs(5);

// =============================================================================
// Test Helpers
// =============================================================================

fn pod_endpoint(legacy_off: bool) -> Endpoint {
    Endpoint::builder(1234)
        .container_id("abcdefghijklmnop")
        .container_if_name("eth0")
        .container_name("web")
        .docker_endpoint_id("dock-1")
        .k8s_namespace("ns1")
        .k8s_pod_name("pod1")
        .disable_legacy_identifiers(legacy_off)
        .build()
}

// =============================================================================
// Accessors
// =============================================================================

#[test]
fn test_plain_accessors() {
    let ep = pod_endpoint(false);

    assert_eq!(ep.id(), 1234);
    assert_eq!(ep.string_id(), "1234");
    assert_eq!(ep.container_id(), "abcdefghijklmnop");
    assert_eq!(ep.short_container_id(), "abcdefghij");
    assert_eq!(ep.container_name(), "web");
    assert_eq!(ep.docker_endpoint_id(), "dock-1");
    assert_eq!(ep.cni_attachment_id(), "abcdefghijklmnop:eth0");
    assert_eq!(ep.k8s_namespace(), "ns1");
    assert_eq!(ep.k8s_pod_name(), "pod1");
    assert_eq!(ep.k8s_namespace_and_pod_name(), "ns1/pod1");
}

#[test]
fn test_cep_name_depends_on_legacy_mode() {
    assert_eq!(pod_endpoint(false).k8s_cep_name(), "pod1");
    assert_eq!(pod_endpoint(true).k8s_cep_name(), "pod1-eth0");
    assert_eq!(pod_endpoint(true).k8s_namespace_and_cep_name(), "ns1/pod1-eth0");
}

#[test]
fn test_human_string_prefers_cep_name() {
    assert_eq!(pod_endpoint(true).human_string(), "ns1/pod1-eth0");
    assert_eq!(pod_endpoint(false).to_string(), "ns1/pod1");
}

#[test]
fn test_human_string_without_pod_uses_namespaced_name() {
    let ep = Endpoint::builder(7).container_id("abc").build();
    assert_eq!(ep.human_string(), "/");

    let ep = Endpoint::builder(8).k8s_namespace("ns").build();
    assert_eq!(ep.k8s_namespace_and_cep_name(), "ns/");
    assert_eq!(ep.human_string(), "ns/");
}

#[test]
fn test_cilium_endpoint_uid_roundtrip() {
    let ep = pod_endpoint(true);
    assert_eq!(ep.cilium_endpoint_uid(), None);

    ep.set_cilium_endpoint_uid("0e5d8b1c-6a47-4c0f-9d38-3f0f4c2f7b11");
    assert_eq!(
        ep.cilium_endpoint_uid(),
        Some(CiliumEndpointUid::new("0e5d8b1c-6a47-4c0f-9d38-3f0f4c2f7b11"))
    );

    ep.set_cilium_endpoint_uid("");
    assert_eq!(ep.cilium_endpoint_uid(), None);
}

#[test]
fn test_ip_setters_feed_identifiers() {
    let ep = pod_endpoint(true);
    assert!(!ep.identifiers().unwrap().contains_key(&IdentifierPrefix::Ipv4));

    ep.set_ipv4(Some(Ipv4Addr::new(10, 0, 1, 5)));
    ep.set_ipv6(Some("fd00::5".parse::<Ipv6Addr>().unwrap()));
    let ids = ep.identifiers().unwrap();
    assert_eq!(ids[&IdentifierPrefix::Ipv4], "10.0.1.5");
    assert_eq!(ids[&IdentifierPrefix::Ipv6], "fd00::5");

    ep.set_ipv4(None);
    assert_eq!(ep.ipv4(), None);
    assert!(!ep.identifiers().unwrap().contains_key(&IdentifierPrefix::Ipv4));
}

#[test]
fn test_identifiers_snapshot_does_not_track_mutation() {
    let ep = pod_endpoint(false);
    let before = ep.identifiers().unwrap();
    ep.set_ipv4(Some(Ipv4Addr::new(192, 168, 0, 1)));
    assert!(!before.contains_key(&IdentifierPrefix::Ipv4));
}

// =============================================================================
// Locked Variants
// =============================================================================

#[test]
fn test_identifiers_locked_under_read_guard() {
    let ep = pod_endpoint(true);
    let guard = ep.lock().read();
    let ids = ep.identifiers_locked(&guard);
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_identifiers_locked_under_write_guard() {
    let ep = pod_endpoint(true);
    let mut guard = ep.lock().write();
    guard.ipv4 = Some(Ipv4Addr::new(10, 9, 8, 7));
    let ids = ep.identifiers_locked(&guard);
    assert_eq!(ids[&IdentifierPrefix::Ipv4], "10.9.8.7");
}

#[test]
fn test_identifiers_locked_ignores_liveness() {
    let ep = pod_endpoint(false);
    ep.mark_deleted();
    let guard = ep.lock().read();
    assert!(!ep.identifiers_locked(&guard).is_empty());
}

// =============================================================================
// Liveness
// =============================================================================

#[test]
fn test_new_endpoint_is_alive() {
    assert_eq!(pod_endpoint(false).state(), EndpointState::Alive);
}

#[test]
fn test_identifiers_on_deleted_endpoint() {
    let ep = pod_endpoint(false);
    assert!(ep.mark_deleted());
    assert!(!ep.mark_deleted());
    assert_eq!(ep.state(), EndpointState::Deleted);

    match ep.identifiers() {
        Err(Error::EndpointNotAlive { id }) => assert_eq!(id, 1234),
        other => panic!("expected EndpointNotAlive, got {:?}", other),
    }
}

#[test]
fn test_unconditional_accessors_work_after_delete() {
    let ep = pod_endpoint(false);
    ep.mark_deleted();
    assert_eq!(ep.container_id(), "abcdefghijklmnop");
    ep.set_cilium_endpoint_uid("uid-1");
    assert_eq!(ep.cilium_endpoint_uid().unwrap().as_str(), "uid-1");
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_shared_reads_do_not_block_each_other() {
    let ep = Arc::new(pod_endpoint(false));
    let _held = ep.lock().read();

    let (tx, rx) = mpsc::channel();
    let reader = Arc::clone(&ep);
    let handle = thread::spawn(move || {
        tx.send(reader.container_id()).unwrap();
    });

    let value = rx
        .recv_timeout(COMPLETES)
        .expect("shared read blocked by another shared holder");
    assert_eq!(value, "abcdefghijklmnop");
    handle.join().unwrap();
}

#[test]
fn test_exclusive_write_blocks_reads_until_released() {
    let ep = Arc::new(pod_endpoint(false));
    let mut held = ep.lock().write();

    let (tx, rx) = mpsc::channel();
    let reader = Arc::clone(&ep);
    let handle = thread::spawn(move || {
        tx.send(reader.cilium_endpoint_uid()).unwrap();
    });

    assert!(
        rx.recv_timeout(BLOCKED).is_err(),
        "read completed while exclusive lock was held"
    );

    held.cilium_endpoint_uid = Some(CiliumEndpointUid::new("uid-after-write"));
    drop(held);

    let observed = rx.recv_timeout(COMPLETES).expect("reader never unblocked");
    assert_eq!(observed, Some(CiliumEndpointUid::new("uid-after-write")));
    handle.join().unwrap();
}

#[test]
fn test_not_alive_fails_without_blocking_on_writer() {
    let ep = Arc::new(pod_endpoint(false));
    ep.mark_deleted();
    let _held = ep.lock().write();

    let (tx, rx) = mpsc::channel();
    let caller = Arc::clone(&ep);
    let handle = thread::spawn(move || {
        tx.send(caller.identifiers().is_err()).unwrap();
    });

    let failed = rx
        .recv_timeout(COMPLETES)
        .expect("liveness gate blocked on the lock");
    assert!(failed);
    handle.join().unwrap();
}

#[test]
fn test_mark_deleted_waits_for_shared_holders() {
    let ep = Arc::new(pod_endpoint(false));
    let held = ep.lock().read_if_alive().unwrap();

    let (tx, rx) = mpsc::channel();
    let deleter = Arc::clone(&ep);
    let handle = thread::spawn(move || {
        tx.send(deleter.mark_deleted()).unwrap();
    });

    assert!(rx.recv_timeout(BLOCKED).is_err(), "delete did not wait");
    drop(held);

    assert!(rx.recv_timeout(COMPLETES).expect("delete never completed"));
    handle.join().unwrap();
    assert!(ep.identifiers().is_err());
}

#[test]
fn test_concurrent_uid_writers_and_readers() {
    const THREADS: usize = 8;
    const ITERATIONS: usize = 200;

    let ep = Arc::new(pod_endpoint(true));
    let barrier = Arc::new(Barrier::new(THREADS * 2));
    let mut handles = Vec::new();

    for t in 0..THREADS {
        let writer = Arc::clone(&ep);
        let start = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            start.wait();
            for i in 0..ITERATIONS {
                writer.set_cilium_endpoint_uid(format!("uid-{}-{}", t, i));
            }
        }));

        let reader = Arc::clone(&ep);
        let start = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            start.wait();
            for _ in 0..ITERATIONS {
                if let Some(uid) = reader.cilium_endpoint_uid() {
                    assert!(uid.as_str().starts_with("uid-"));
                }
                let ids = reader.identifiers().unwrap();
                assert_eq!(ids[&IdentifierPrefix::CepName], "ns1/pod1-eth0");
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let last = ep.cilium_endpoint_uid().unwrap();
    assert!(last.as_str().ends_with(&format!("-{}", ITERATIONS - 1)));
}
