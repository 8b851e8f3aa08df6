//! Undo/redo history tests for CompositionStore.

use super::{create_test_composition, padding_patch, store_with_limit, CompositionStore};
use crate::state::StatePatch;

#[tokio::test]
async fn test_undo_at_oldest_entry_returns_false() {
    let store = CompositionStore::new();
    assert!(!store.can_undo().await);
    assert!(!store.undo().await);
}

#[tokio::test]
async fn test_redo_at_newest_entry_returns_false() {
    let store = CompositionStore::new();
    store.set(padding_patch(1), true).await;
    assert!(!store.can_redo().await);
    assert!(!store.redo().await);
}

#[tokio::test]
async fn test_undo_restores_previous_snapshot_exactly() {
    let store = CompositionStore::new();
    let initial = store.get().await;
    store
        .set(
            StatePatch::default().composition(Some(create_test_composition("phone"))),
            true,
        )
        .await;

    assert!(store.undo().await);
    assert_eq!(store.get().await, initial);
}

#[tokio::test]
async fn test_redo_after_undo() {
    let store = CompositionStore::new();
    store.set(padding_patch(10), true).await;
    let edited = store.get().await;

    assert!(store.undo().await);
    assert!(store.can_redo().await);
    assert!(store.redo().await);
    assert_eq!(store.get().await, edited);
}

#[tokio::test]
async fn test_new_edit_after_undo_truncates_redo_branch() {
    let store = CompositionStore::new();
    store.set(padding_patch(1), true).await;
    store.set(padding_patch(2), true).await;
    assert!(store.undo().await);

    store.set(padding_patch(3), true).await;
    assert!(!store.can_redo().await);
    assert_eq!(store.history_len().await, 3);

    assert!(store.undo().await);
    assert_eq!(store.get().await.properties.padding, 1);
}

#[tokio::test]
async fn test_history_cap_drops_oldest() {
    let store = CompositionStore::new();
    for i in 0..60 {
        store.set(padding_patch(i), true).await;
    }
    assert_eq!(store.history_len().await, 50);

    let mut undos = 0;
    while store.undo().await {
        undos += 1;
    }
    assert_eq!(undos, 49);
    // Oldest retained entry is the 11th edit.
    assert_eq!(store.get().await.properties.padding, 10);
}

#[tokio::test]
async fn test_custom_history_limit() {
    let store = store_with_limit(3);
    for i in 0..5 {
        store.set(padding_patch(i), true).await;
    }
    assert_eq!(store.history_len().await, 3);
}

#[tokio::test]
async fn test_zero_limit_keeps_current_entry() {
    let store = store_with_limit(0);
    store.set(padding_patch(5), true).await;
    assert_eq!(store.history_len().await, 1);
    assert!(!store.undo().await);
}

#[tokio::test]
async fn test_non_historical_change_is_discarded_by_undo() {
    let store = CompositionStore::new();
    store.set(padding_patch(4), true).await;
    store.set(StatePatch::default().zoom(1.8), false).await;

    assert!(store.undo().await);
    let state = store.get().await;
    assert_eq!(state.properties.padding, 24);
    assert_eq!(state.zoom, 1.0);
}
