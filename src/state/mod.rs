//! Shared console state: the view model store and its change notifications.

/// Edit-intent tracking for in-progress operator edits.
pub mod edit;
/// Team-score ranking derivation.
pub mod ranking;
/// The view model and event merge policy.
pub mod view;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::dto::event::DashboardEvent;
use crate::state::edit::{EditIntent, EditTracker};
use crate::state::view::ViewModel;

/// Handle to the shared console state, cloned cheaply across tasks.
pub type SharedState = Arc<DashboardState>;

/// Connection status of the event stream, surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// No subscription is active.
    #[default]
    Disconnected,
    /// A subscription is being established.
    Connecting,
    /// Events are flowing.
    Connected,
}

/// Everything guarded by the store's single exclusive-access path.
///
/// The edit tracker lives next to the view model so a merge and its shield
/// lookup happen under one lock acquisition, preserving synchronous-apply
/// semantics on the multi-threaded runtime.
#[derive(Debug, Default)]
struct Inner {
    view: ViewModel,
    edit: EditTracker,
}

/// The authoritative in-memory console state.
///
/// All mutation flows through [`DashboardState::apply_event`] and the edit
/// methods; events apply in the order they were delivered by the transport.
/// Observers are notified through watch channels rather than any reactivity
/// runtime: the revision counter bumps once per applied event.
pub struct DashboardState {
    inner: RwLock<Inner>,
    connection: watch::Sender<ConnectionPhase>,
    revision: watch::Sender<u64>,
}

impl DashboardState {
    /// Construct a fresh store wrapped in an [`Arc`].
    pub fn new() -> SharedState {
        let (connection, _) = watch::channel(ConnectionPhase::Disconnected);
        let (revision, _) = watch::channel(0);
        Arc::new(Self {
            inner: RwLock::new(Inner::default()),
            connection,
            revision,
        })
    }

    /// Merge one decoded event into the view model and notify observers.
    pub async fn apply_event(&self, event: DashboardEvent) {
        {
            let mut inner = self.inner.write().await;
            let Inner { view, edit } = &mut *inner;
            view.apply(event, edit);
        }
        self.bump_revision();
    }

    /// Read the view model through a closure, without cloning it.
    pub async fn read_view<F, T>(&self, read: F) -> T
    where
        F: FnOnce(&ViewModel) -> T,
    {
        let inner = self.inner.read().await;
        read(&inner.view)
    }

    /// Record that the operator focused a player field.
    pub async fn begin_edit(&self, intent: EditIntent) {
        self.inner.write().await.edit.begin_edit(intent);
    }

    /// Record that the operator left a player field.
    pub async fn end_edit(&self, intent: EditIntent) {
        self.inner.write().await.edit.end_edit(intent);
    }

    /// Whether the given pair is currently under edit.
    pub async fn is_editing(&self, intent: EditIntent) -> bool {
        self.inner.read().await.edit.is_editing(intent)
    }

    /// Drop the scrolling log on explicit operator request.
    pub async fn clear_logs(&self) {
        self.inner.write().await.view.clear_logs();
        self.bump_revision();
    }

    /// Publish a connection phase change.
    pub fn set_connection(&self, phase: ConnectionPhase) {
        self.connection.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }

    /// Current connection phase.
    pub fn connection_phase(&self) -> ConnectionPhase {
        *self.connection.borrow()
    }

    /// Whether the event stream is currently connected.
    pub fn is_connected(&self) -> bool {
        self.connection_phase() == ConnectionPhase::Connected
    }

    /// Subscribe to connection phase changes.
    pub fn connection_watcher(&self) -> watch::Receiver<ConnectionPhase> {
        self.connection.subscribe()
    }

    /// Subscribe to store revisions; bumped once per applied event.
    pub fn revision_watcher(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::edit::PlayerField;

    #[tokio::test]
    async fn apply_event_bumps_revision() {
        let state = DashboardState::new();
        let watcher = state.revision_watcher();
        assert_eq!(*watcher.borrow(), 0);

        state.apply_event(DashboardEvent::IsPlaying(true)).await;
        assert_eq!(*watcher.borrow(), 1);
        assert!(state.read_view(|view| view.game.playing).await);

        state.apply_event(DashboardEvent::TimeLeft(0)).await;
        assert_eq!(*watcher.borrow(), 2);
        assert!(!state.read_view(|view| view.game.playing).await);
    }

    #[tokio::test]
    async fn edit_methods_share_the_merge_lock() {
        let state = DashboardState::new();
        let intent = EditIntent::new(1, PlayerField::Name);

        state.begin_edit(intent).await;
        assert!(state.is_editing(intent).await);

        // Mismatched exit must not clear the active intent.
        state.end_edit(EditIntent::new(1, PlayerField::Damage)).await;
        assert!(state.is_editing(intent).await);

        state.end_edit(intent).await;
        assert!(!state.is_editing(intent).await);
    }

    #[tokio::test]
    async fn connection_phase_deduplicates_notifications() {
        let state = DashboardState::new();
        let mut watcher = state.connection_watcher();

        state.set_connection(ConnectionPhase::Connected);
        assert!(watcher.has_changed().unwrap());
        watcher.mark_unchanged();

        state.set_connection(ConnectionPhase::Connected);
        assert!(!watcher.has_changed().unwrap());
        assert!(state.is_connected());
    }

    #[tokio::test]
    async fn clear_logs_resets_the_sequence() {
        let state = DashboardState::new();
        for i in 0..3 {
            state.apply_event(DashboardEvent::Log(format!("line {i}"))).await;
        }
        assert_eq!(state.read_view(|view| view.logs.len()).await, 3);

        state.clear_logs().await;
        assert_eq!(state.read_view(|view| view.logs.len()).await, 0);
    }
}
