//! Subscriber channel and notification broadcasting tests for CompositionStore.

use super::{padding_patch, CompositionStore};
use crate::state::{ChangeReason, StatePatch};
use tokio::sync::broadcast::error::TryRecvError;

// =========================================================================
// Subscriber Channel Tests
// =========================================================================

#[test]
fn test_store_new_initializes_subscriber_channel() {
    let store = CompositionStore::new();
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn test_store_multiple_subscribers() {
    let store = CompositionStore::new();
    let _rx1 = store.subscribe();
    let _rx2 = store.subscribe();
    let _rx3 = store.subscribe();
    assert_eq!(store.subscriber_count(), 3);
}

#[test]
fn test_store_subscriber_dropped_decrements_count() {
    let store = CompositionStore::new();
    let rx1 = store.subscribe();
    let rx2 = store.subscribe();
    assert_eq!(store.subscriber_count(), 2);
    drop(rx1);
    assert_eq!(store.subscriber_count(), 1);
    drop(rx2);
    assert_eq!(store.subscriber_count(), 0);
}

// =========================================================================
// Notification Tests
// =========================================================================

#[tokio::test]
async fn test_set_notifies_with_new_snapshot() {
    let store = CompositionStore::new();
    let mut rx = store.subscribe();

    store.set(padding_patch(30), true).await;

    let change = rx.recv().await.expect("change");
    assert_eq!(change.reason, ChangeReason::Set);
    assert_eq!(change.state.properties.padding, 30);
}

#[tokio::test]
async fn test_non_historical_set_still_notifies() {
    let store = CompositionStore::new();
    let mut rx = store.subscribe();
    store.set(StatePatch::default().zoom(0.7), false).await;
    let change = rx.recv().await.expect("change");
    assert_eq!(change.state.zoom, 0.7);
}

#[tokio::test]
async fn test_undo_and_redo_notify() {
    let store = CompositionStore::new();
    store.set(padding_patch(30), true).await;
    let mut rx = store.subscribe();

    store.undo().await;
    store.redo().await;

    let undo = rx.recv().await.expect("undo change");
    assert_eq!(undo.reason, ChangeReason::Undo);
    assert_eq!(undo.state.properties.padding, 24);
    let redo = rx.recv().await.expect("redo change");
    assert_eq!(redo.reason, ChangeReason::Redo);
    assert_eq!(redo.state.properties.padding, 30);
}

#[tokio::test]
async fn test_failed_try_update_does_not_notify() {
    let store = CompositionStore::new();
    let mut rx = store.subscribe();
    let _: Result<(), ()> = store.try_update(true, |_| Err(())).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_dropped_subscriber_does_not_block_others() {
    let store = CompositionStore::new();
    let dropped = store.subscribe();
    let mut alive = store.subscribe();
    drop(dropped);

    store.set(padding_patch(5), true).await;
    let change = alive.recv().await.expect("change");
    assert_eq!(change.state.properties.padding, 5);
}

#[tokio::test]
async fn test_set_without_subscribers_succeeds() {
    let store = CompositionStore::new();
    store.set(padding_patch(6), true).await;
    assert_eq!(store.get().await.properties.padding, 6);
}
