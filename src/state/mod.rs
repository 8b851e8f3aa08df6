//! Composition state store.
//!
//! This module provides the single source of truth for the editor: the
//! current [`CompositionState`] snapshot, a bounded undo/redo history, and a
//! broadcast channel for subscriber notifications. State lives behind
//! `Arc<RwLock>` so the store can be cloned into every component that needs
//! it, and every mutation runs entirely under one write guard.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

#[cfg(test)]
mod tests;

mod history;
mod snapshot;

use history::History;
pub use history::DEFAULT_HISTORY_LIMIT;
pub use snapshot::{
    clamp_zoom, CompositionState, LinearAlign, Metadata, ParsePropertyError, Properties,
    ScaleMode, StatePatch, DEFAULT_GAP, DEFAULT_PADDING, DEFAULT_ROUNDNESS, MAX_PADDING, MAX_ZOOM,
    MIN_ZOOM, ZOOM_STEP,
};

/// Default capacity for the subscriber notification channel.
const DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

/// Why subscribers are being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    Set,
    Undo,
    Redo,
}

/// Notification delivered to subscribers after every state change.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub reason: ChangeReason,
    pub state: Arc<CompositionState>,
}

struct StoreInner {
    state: CompositionState,
    history: History,
}

/// Thread-safe state store with undo/redo and change notifications.
///
/// Subscribers each own a broadcast receiver, so a slow or dropped
/// subscriber never blocks delivery to the others.
///
/// # Example
///
/// ```
/// use pictrikit::state::{CompositionStore, StatePatch};
///
/// #[tokio::main]
/// async fn main() {
///     let store = CompositionStore::new();
///     store.set(StatePatch::default().zoom(1.5), false).await;
///     assert_eq!(store.get().await.zoom, 1.5);
/// }
/// ```
#[derive(Clone)]
pub struct CompositionStore {
    inner: Arc<RwLock<StoreInner>>,
    /// Broadcast channel sender for subscriber notifications.
    update_tx: broadcast::Sender<StateChange>,
}

impl std::fmt::Debug for CompositionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionStore")
            .field("subscriber_count", &self.update_tx.receiver_count())
            .finish_non_exhaustive()
    }
}

impl CompositionStore {
    /// Creates a store with default properties and history limit.
    pub fn new() -> Self {
        Self::with_options(Properties::default(), DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a store whose initial snapshot uses `properties`, keeping at
    /// most `history_limit` snapshots.
    pub fn with_options(properties: Properties, history_limit: usize) -> Self {
        let (update_tx, _rx) = broadcast::channel(DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY);
        let state = CompositionState::new(properties);
        let history = History::new(state.clone(), history_limit);
        Self {
            inner: Arc::new(RwLock::new(StoreInner { state, history })),
            update_tx,
        }
    }

    /// Subscribes to state change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.update_tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.update_tx.receiver_count()
    }

    /// Returns a clone of the current snapshot.
    pub async fn get(&self) -> CompositionState {
        self.inner.read().await.state.clone()
    }

    /// Merges `patch` into the current state.
    ///
    /// Stamps the update time, pushes a history entry when `record_history`
    /// is set, and notifies subscribers.
    pub async fn set(&self, patch: StatePatch, record_history: bool) {
        self.update(record_history, |state| patch.apply(state)).await
    }

    /// Runs `f` against a copy of the state and commits the copy.
    pub async fn update<R>(
        &self,
        record_history: bool,
        f: impl FnOnce(&mut CompositionState) -> R,
    ) -> R {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.clone();
        let out = f(&mut next);
        self.commit(&mut inner, next, record_history);
        out
    }

    /// Like [`update`](Self::update), but commits only when `f` succeeds.
    ///
    /// On error the live state is untouched and nobody is notified.
    pub async fn try_update<R, E>(
        &self,
        record_history: bool,
        f: impl FnOnce(&mut CompositionState) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.clone();
        let out = f(&mut next)?;
        self.commit(&mut inner, next, record_history);
        Ok(out)
    }

    /// Restores the previous history entry. Returns `false` at the oldest
    /// entry.
    pub async fn undo(&self) -> bool {
        let mut inner = self.inner.write().await;
        let Some(previous) = inner.history.undo().cloned() else {
            tracing::debug!("Undo requested with no earlier history entry");
            return false;
        };
        inner.state = previous;
        tracing::debug!(cursor = inner.history.cursor(), "Undo applied");
        self.broadcast(ChangeReason::Undo, &inner.state);
        true
    }

    /// Re-applies the next history entry. Returns `false` at the newest entry.
    pub async fn redo(&self) -> bool {
        let mut inner = self.inner.write().await;
        let Some(next) = inner.history.redo().cloned() else {
            tracing::debug!("Redo requested with no later history entry");
            return false;
        };
        inner.state = next;
        tracing::debug!(cursor = inner.history.cursor(), "Redo applied");
        self.broadcast(ChangeReason::Redo, &inner.state);
        true
    }

    pub async fn can_undo(&self) -> bool {
        self.inner.read().await.history.can_undo()
    }

    pub async fn can_redo(&self) -> bool {
        self.inner.read().await.history.can_redo()
    }

    /// Returns the count of retained history entries.
    pub async fn history_len(&self) -> usize {
        self.inner.read().await.history.len()
    }

    fn commit(&self, inner: &mut StoreInner, mut next: CompositionState, record_history: bool) {
        next.metadata.updated_at = Utc::now();
        if record_history {
            inner.history.push(next.clone());
        }
        inner.state = next;
        self.broadcast(ChangeReason::Set, &inner.state);
    }

    fn broadcast(&self, reason: ChangeReason, state: &CompositionState) {
        let change = StateChange {
            reason,
            state: Arc::new(state.clone()),
        };
        match self.update_tx.send(change) {
            Ok(count) => {
                tracing::trace!("Broadcast update sent to {} subscribers", count);
            }
            Err(_) => {
                tracing::debug!("No subscribers for state update broadcast");
            }
        }
    }
}

impl Default for CompositionStore {
    fn default() -> Self {
        Self::new()
    }
}
