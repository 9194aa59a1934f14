//! Shared machine state
//!
//! Thread-safe shared state coordinating the sorting engine, reset handling
//! and presentation-side readers. The engine is the sole writer of item
//! state during a run; reset is the sole writer for wholesale clearing;
//! everyone else takes snapshot reads.

use crate::registry::ItemRegistry;
use beansort_common::events::{EventBus, SortEvent};
use beansort_common::types::{ItemSnapshot, MachineState};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes.
pub struct SharedState {
    /// The item collection (ingestion order)
    pub registry: RwLock<ItemRegistry>,

    /// Overall machine status (idle or actively sorting)
    pub machine_state: RwLock<MachineState>,

    /// Event broadcaster for presentation-side listeners
    event_bus: EventBus,

    /// Reset epoch
    ///
    /// Bumped by every reset. A run captures the value at start and
    /// re-checks it after each suspension; a mismatch means the run was
    /// invalidated mid-flight and must abort without further transitions.
    reset_epoch: AtomicU64,
}

impl SharedState {
    /// Create new shared state around an item registry
    pub fn new(registry: ItemRegistry, event_capacity: usize) -> Self {
        Self {
            registry: RwLock::new(registry),
            machine_state: RwLock::new(MachineState::Idle),
            event_bus: EventBus::new(event_capacity),
            reset_epoch: AtomicU64::new(0),
        }
    }

    /// Broadcast an event to all listeners (no listeners is OK)
    pub fn broadcast_event(&self, event: SortEvent) {
        self.event_bus.emit_lossy(event);
    }

    /// Subscribe to the machine's event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<SortEvent> {
        self.event_bus.subscribe()
    }

    /// Get current machine state
    pub async fn machine_state(&self) -> MachineState {
        *self.machine_state.read().await
    }

    /// Current reset epoch
    pub fn reset_epoch(&self) -> u64 {
        self.reset_epoch.load(Ordering::Acquire)
    }

    /// Bump the reset epoch, invalidating any run in flight
    pub fn advance_reset_epoch(&self) -> u64 {
        self.reset_epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Snapshot of every item for the read surface
    pub async fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.registry.read().await.snapshot()
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState")
            .field("reset_epoch", &self.reset_epoch())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> SharedState {
        let dir = std::env::temp_dir().join(format!("beansort-state-test-{}", uuid::Uuid::new_v4()));
        let registry = ItemRegistry::new(dir).unwrap();
        SharedState::new(registry, 100)
    }

    #[tokio::test]
    async fn test_machine_state() {
        let state = test_state();

        // Default is Idle
        assert_eq!(state.machine_state().await, MachineState::Idle);

        // Can set to Sorting
        *state.machine_state.write().await = MachineState::Sorting;
        assert_eq!(state.machine_state().await, MachineState::Sorting);
    }

    #[tokio::test]
    async fn test_reset_epoch_advances() {
        let state = test_state();

        assert_eq!(state.reset_epoch(), 0);
        assert_eq!(state.advance_reset_epoch(), 1);
        assert_eq!(state.advance_reset_epoch(), 2);
        assert_eq!(state.reset_epoch(), 2);
    }

    #[tokio::test]
    async fn test_broadcast_and_subscribe() {
        let state = test_state();
        let mut rx = state.subscribe_events();

        state.broadcast_event(SortEvent::RunStarted {
            item_count: 1,
            timestamp: chrono::Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "RunStarted");
    }

    #[tokio::test]
    async fn test_snapshot_empty() {
        let state = test_state();
        assert!(state.snapshot().await.is_empty());
    }
}
