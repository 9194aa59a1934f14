//! # Beansort Machine Library
//!
//! The sorting machine service: item registry, shared state, classifier
//! interface with the random stub, and the sequential sorting engine.
//!
//! **Purpose:** ingest image files into a queue, drive each through the
//! scan/travel/drop lifecycle one at a time with animation-accurate holds,
//! and expose snapshots plus an event stream for presentation layers.

pub mod classifier;
pub mod engine;
pub mod registry;
pub mod state;

pub use engine::SortingEngine;
pub use state::SharedState;
