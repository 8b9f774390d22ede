//! Tests for handler registration and fan-out

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Barrier;
use tokio_test::{assert_err, assert_ok};

use super::helpers::{counting, interpreter};
use crate::interpreter::{HandlerRegistry, InterpreterError};

#[test]
fn test_registry_register_and_unregister() {
    let registry = HandlerRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    assert!(!registry.has_handler("forward1"));

    registry.register("forward1", "character", counting(&calls));
    registry.register("forward1", "audio", counting(&calls));
    assert!(registry.has_handler("forward1"));
    assert_eq!(registry.handlers_for("forward1").len(), 2);
    assert!(registry.handlers_for("left45").is_empty());

    assert!(registry.unregister("forward1", "audio"));
    assert!(!registry.unregister("forward1", "audio"));
    assert!(registry.has_handler("forward1"));

    assert!(registry.unregister("forward1", "character"));
    assert!(!registry.has_handler("forward1"));
    assert!(!registry.unregister("left45", "character"));
}

#[test]
fn test_registry_handlers_run_outside_lock() {
    let registry = HandlerRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    registry.register("forward1", "character", counting(&calls));

    let handlers = registry.handlers_for("forward1");
    // Registering while holding a snapshot must not deadlock
    registry.register("forward1", "audio", counting(&calls));

    let results: Vec<_> = handlers
        .iter()
        .map(|handler| tokio_test::block_on(handler(100)))
        .collect();
    assert_eq!(results.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reregistering_replaces_handler() {
    let interp = interpreter(vec![], 0);
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    interp.register_handler("forward1", "character", counting(&first));
    interp.register_handler("forward1", "character", counting(&second));
    assert_ok!(interp.do_command("forward1").await);

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_command_fans_out_to_every_namespace() {
    let interp = interpreter(vec![], 0);
    let calls = Arc::new(AtomicUsize::new(0));
    for namespace in ["character", "audio", "announcer"] {
        interp.register_handler("left90", namespace, counting(&calls));
    }

    assert_ok!(interp.do_command("left90").await);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_handlers_run_concurrently() {
    let interp = interpreter(vec![], 0);
    let barrier = Arc::new(Barrier::new(2));

    // Each handler waits for the other; run one after the other they would hang
    for namespace in ["character", "audio"] {
        let barrier = barrier.clone();
        interp.register_handler("forward1", namespace, move |_| {
            let barrier = barrier.clone();
            async move {
                barrier.wait().await;
                anyhow::Ok(())
            }
        });
    }

    let result = tokio::time::timeout(Duration::from_secs(5), interp.do_command("forward1")).await;
    assert_ok!(assert_ok!(result));
}

#[tokio::test]
async fn test_unregistered_command_is_unknown() {
    let interp = interpreter(vec![], 0);
    let calls = Arc::new(AtomicUsize::new(0));
    interp.register_handler("forward1", "character", counting(&calls));
    assert!(interp.has_handler("forward1"));

    assert!(interp.unregister_handler("forward1", "character"));
    assert!(!interp.has_handler("forward1"));

    let err = assert_err!(interp.do_command("forward1").await);
    assert!(matches!(err, InterpreterError::UnknownCommand(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
