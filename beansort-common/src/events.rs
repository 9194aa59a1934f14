//! Event types and event bus for the sorting machine
//!
//! The machine communicates outward through one-to-many broadcast events:
//! the engine emits, presentation layers subscribe. Slow or absent
//! subscribers never block the engine.

use crate::types::{RoastClass, SortStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Machine event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SortEvent {
    /// New items entered the queue
    ItemsIngested {
        item_ids: Vec<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A sorting run started over a snapshot of the queue
    RunStarted {
        item_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An item moved to a new lifecycle status
    ItemStatusChanged {
        item_id: Uuid,
        status: SortStatus,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Classification outcome attached to an item (status unchanged)
    ItemClassified {
        item_id: Uuid,
        label: Option<RoastClass>,
        confidence: Option<f64>,
        is_error: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Destination computed for an item about to travel
    ItemRouted {
        item_id: Uuid,
        /// Horizontal offset of the destination lane, in pixels
        offset: f64,
        /// Travel duration in seconds (the animation holds for the same span)
        duration_secs: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A run processed its whole snapshot; machine is idle again
    RunCompleted {
        sorted: usize,
        errored: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A run was cut short by a reset
    RunAborted {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Registry cleared and all previews released
    MachineReset {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SortEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            SortEvent::ItemsIngested { .. } => "ItemsIngested",
            SortEvent::RunStarted { .. } => "RunStarted",
            SortEvent::ItemStatusChanged { .. } => "ItemStatusChanged",
            SortEvent::ItemClassified { .. } => "ItemClassified",
            SortEvent::ItemRouted { .. } => "ItemRouted",
            SortEvent::RunCompleted { .. } => "RunCompleted",
            SortEvent::RunAborted { .. } => "RunAborted",
            SortEvent::MachineReset { .. } => "MachineReset",
        }
    }
}

/// One-to-many event broadcaster
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SortEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered before old events are
    /// dropped for lagging subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SortEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: SortEvent) -> Result<usize, broadcast::error::SendError<SortEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// The engine uses this for every emission: a headless run (no
    /// presentation attached) is a valid mode of operation.
    pub fn emit_lossy(&self, event: SortEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
