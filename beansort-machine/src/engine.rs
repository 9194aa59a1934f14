//! Sorting engine - the sequential lifecycle driver
//!
//! **Responsibilities:**
//! - Ingest image files into the registry as queued items
//! - Drive each queued item through the fixed lifecycle
//!   (queued -> scanning -> traveling -> dropping -> sorted/errored)
//!   on a single task, one item at a time
//! - Hold each state exactly as long as the matching animation plays
//! - Honor reset: abort the remaining run after any suspension
//!
//! The engine never processes two items in parallel. That serialization is
//! a design choice matching a single physical scanning/conveyor station,
//! not a limitation: item i+1 does not begin scanning until item i is
//! terminal.

use crate::classifier::Classifier;
use crate::state::SharedState;
use beansort_common::events::SortEvent;
use beansort_common::geometry::LaneLayout;
use beansort_common::params::SortTiming;
use beansort_common::types::{ItemSnapshot, MachineState, RoastClass, SortStatus};
use beansort_common::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The sequential sorting driver
///
/// Cheap to clone: all heavy state lives behind `Arc`s. One instance (or
/// any clone) may be driven from multiple call sites; re-entrancy is
/// guarded internally.
#[derive(Clone)]
pub struct SortingEngine {
    state: Arc<SharedState>,
    classifier: Arc<dyn Classifier>,
    /// Left-to-right lane ordering; shared verbatim with presentation
    classes: Vec<RoastClass>,
    layout: LaneLayout,
    timing: SortTiming,
}

impl SortingEngine {
    pub fn new(
        state: Arc<SharedState>,
        classifier: Arc<dyn Classifier>,
        classes: Vec<RoastClass>,
        layout: LaneLayout,
        timing: SortTiming,
    ) -> Self {
        Self {
            state,
            classifier,
            classes,
            layout,
            timing,
        }
    }

    /// Ingest image files as queued items
    ///
    /// Each file becomes one `Queued` item with a freshly derived preview.
    /// On error, files ingested before the failing one stay queued.
    pub async fn ingest(&self, sources: &[PathBuf]) -> Result<Vec<Uuid>> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let ids = {
            let mut registry = self.state.registry.write().await;
            let mut ids = Vec::with_capacity(sources.len());
            for source in sources {
                ids.push(registry.ingest(source)?);
            }
            ids
        };

        info!("ingested {} item(s)", ids.len());
        self.state.broadcast_event(SortEvent::ItemsIngested {
            item_ids: ids.clone(),
            timestamp: chrono::Utc::now(),
        });

        Ok(ids)
    }

    /// Start a sorting run over the current queue
    ///
    /// Snapshots the queued items in ingestion order and drives them to
    /// completion on a spawned task. Items ingested after the snapshot stay
    /// queued until the next start. Returns false (and does nothing) when a
    /// run is already active or the queue is empty.
    pub async fn start(&self) -> bool {
        // Capture the epoch before the snapshot: a reset between here and
        // the first transition makes the run abort on its first check.
        let epoch = self.state.reset_epoch();

        let snapshot = {
            let mut machine = self.state.machine_state.write().await;
            if *machine == MachineState::Sorting {
                debug!("start ignored: run already active");
                return false;
            }

            let queued = self.state.registry.read().await.queued_ids();
            if queued.is_empty() {
                debug!("start ignored: queue is empty");
                return false;
            }

            *machine = MachineState::Sorting;
            queued
        };

        info!("sorting run started over {} item(s)", snapshot.len());
        self.state.broadcast_event(SortEvent::RunStarted {
            item_count: snapshot.len(),
            timestamp: chrono::Utc::now(),
        });

        let engine = self.clone();
        tokio::spawn(async move {
            engine.run(snapshot, epoch).await;
        });

        true
    }

    /// Reset the machine unconditionally
    ///
    /// Invalidates any run in flight, releases every preview, clears the
    /// registry and returns the machine to idle. There is no partial reset.
    pub async fn reset(&self) {
        self.state.advance_reset_epoch();

        *self.state.machine_state.write().await = MachineState::Idle;
        self.state.registry.write().await.clear_and_release();

        info!("machine reset: registry cleared, previews released");
        self.state.broadcast_event(SortEvent::MachineReset {
            timestamp: chrono::Utc::now(),
        });
    }

    /// Snapshot of every item for the read surface
    pub async fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.state.snapshot().await
    }

    /// Current machine state
    pub async fn machine_state(&self) -> MachineState {
        self.state.machine_state().await
    }

    /// Subscribe to the machine's event stream
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SortEvent> {
        self.state.subscribe_events()
    }

    /// The lane ordering this engine routes with
    pub fn classes(&self) -> &[RoastClass] {
        &self.classes
    }

    // ========== Run internals ==========

    /// Drive one run over a queue snapshot
    async fn run(self, ids: Vec<Uuid>, epoch: u64) {
        let mut sorted = 0usize;
        let mut errored = 0usize;

        for (index, id) in ids.iter().enumerate() {
            match self.process_item(*id, epoch).await {
                Some(SortStatus::Sorted) => sorted += 1,
                Some(SortStatus::Errored) => errored += 1,
                Some(_) => unreachable!("process_item only resolves terminal states"),
                None => {
                    self.abort_run();
                    return;
                }
            }

            // Pause between items; the last one idles the machine directly
            if index + 1 < ids.len()
                && !self.hold(self.timing.inter_item_pause(), epoch).await
            {
                self.abort_run();
                return;
            }
        }

        // A reset may have landed between the last check and here; only
        // declare the run complete if it is still the live one.
        let mut machine = self.state.machine_state.write().await;
        if self.state.reset_epoch() != epoch {
            drop(machine);
            self.abort_run();
            return;
        }
        *machine = MachineState::Idle;
        drop(machine);

        info!(sorted, errored, "sorting run completed");
        self.state.broadcast_event(SortEvent::RunCompleted {
            sorted,
            errored,
            timestamp: chrono::Utc::now(),
        });
    }

    fn abort_run(&self) {
        info!("sorting run aborted by reset");
        self.state.broadcast_event(SortEvent::RunAborted {
            timestamp: chrono::Utc::now(),
        });
    }

    /// Drive one item from queued to terminal
    ///
    /// Returns the terminal status reached, or None when a reset
    /// invalidated the run mid-flight.
    async fn process_item(&self, id: Uuid, epoch: u64) -> Option<SortStatus> {
        // Scan
        if !self.transition(id, SortStatus::Scanning, epoch).await {
            return None;
        }
        if !self.hold(self.timing.scan_hold(), epoch).await {
            return None;
        }

        // Classify exactly once; the call may be slow and the run may be
        // reset underneath it, so re-check before touching the registry.
        let item = self.state.registry.read().await.snapshot_item(id)?;
        let outcome = self.classifier.classify(&item).await;
        if self.state.reset_epoch() != epoch {
            return None;
        }

        // Attach the outcome; status stays Scanning until the travel begins
        if !self.state.registry.write().await.attach_outcome(id, &outcome) {
            return None;
        }

        let (label, confidence, is_error) = match &outcome {
            Ok(c) => (Some(c.label), Some(c.confidence), false),
            Err(_) => (None, None, true),
        };

        match &outcome {
            Ok(c) => info!(item = %id, label = %c.label, confidence = c.confidence, "item classified"),
            Err(_) => warn!(item = %id, "classification failed, routing to error lane"),
        }
        self.state.broadcast_event(SortEvent::ItemClassified {
            item_id: id,
            label,
            confidence,
            is_error,
            timestamp: chrono::Utc::now(),
        });

        // Route: presentation computes the same destination from the same
        // inputs, so the travel hold below matches the animation exactly.
        let dest = self.layout.destination(label, is_error, &self.classes);
        debug!(
            item = %id,
            offset = dest.offset,
            duration = dest.duration_secs,
            "destination computed"
        );
        self.state.broadcast_event(SortEvent::ItemRouted {
            item_id: id,
            offset: dest.offset,
            duration_secs: dest.duration_secs,
            timestamp: chrono::Utc::now(),
        });

        // Travel
        if !self.transition(id, SortStatus::Traveling, epoch).await {
            return None;
        }
        let travel = Duration::from_secs_f64(dest.duration_secs) + self.timing.travel_settle();
        if !self.hold(travel, epoch).await {
            return None;
        }

        // Drop
        if !self.transition(id, SortStatus::Dropping, epoch).await {
            return None;
        }
        if !self.hold(self.timing.drop_hold(), epoch).await {
            return None;
        }

        // Terminal
        let terminal = if is_error {
            SortStatus::Errored
        } else {
            SortStatus::Sorted
        };
        if !self.transition(id, terminal, epoch).await {
            return None;
        }

        Some(terminal)
    }

    /// Move an item to a new status and announce it
    ///
    /// Returns false when the run is no longer live (reset epoch moved, or
    /// the item vanished with a cleared registry).
    async fn transition(&self, id: Uuid, status: SortStatus, epoch: u64) -> bool {
        if self.state.reset_epoch() != epoch {
            return false;
        }

        if !self.state.registry.write().await.set_status(id, status) {
            return false;
        }

        debug!(item = %id, %status, "item status changed");
        self.state.broadcast_event(SortEvent::ItemStatusChanged {
            item_id: id,
            status,
            timestamp: chrono::Utc::now(),
        });

        true
    }

    /// Suspend for `duration`, then report whether the run is still live
    async fn hold(&self, duration: Duration, epoch: u64) -> bool {
        sleep(duration).await;
        self.state.reset_epoch() == epoch
    }
}

impl std::fmt::Debug for SortingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortingEngine")
            .field("classes", &self.classes)
            .field("layout", &self.layout)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
