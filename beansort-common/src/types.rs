//! Core domain types shared across the Beansort crates

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Roast classes the machine sorts into
///
/// The variant order here is also the canonical left-to-right lane order on
/// the machine: Dark is the lane nearest the scanner, Medium the farthest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoastClass {
    /// Dark roast: near-black, oily bean surface
    Dark,
    /// Green: raw, unroasted bean
    Green,
    /// Light roast: pale brown, origin character dominant
    Light,
    /// Medium roast: balanced, everyday profile
    Medium,
}

impl RoastClass {
    /// All variants in canonical lane order
    pub fn all_variants() -> &'static [RoastClass] {
        &[
            RoastClass::Dark,
            RoastClass::Green,
            RoastClass::Light,
            RoastClass::Medium,
        ]
    }

    /// The default left-to-right lane ordering used by the machine
    pub fn default_order() -> Vec<RoastClass> {
        Self::all_variants().to_vec()
    }

    /// Parse from a string (case insensitive)
    pub fn from_str(s: &str) -> Option<RoastClass> {
        match s.to_lowercase().as_str() {
            "dark" => Some(RoastClass::Dark),
            "green" => Some(RoastClass::Green),
            "light" => Some(RoastClass::Light),
            "medium" => Some(RoastClass::Medium),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoastClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoastClass::Dark => write!(f, "Dark"),
            RoastClass::Green => write!(f, "Green"),
            RoastClass::Light => write!(f, "Light"),
            RoastClass::Medium => write!(f, "Medium"),
        }
    }
}

/// Lifecycle status of one item moving through the machine
///
/// `Queued` is the only initial state; `Sorted` and `Errored` are terminal.
/// At most one item is ever in `Scanning`, `Traveling` or `Dropping` at a
/// time (single scanning/conveyor station).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStatus {
    Queued,
    Scanning,
    Traveling,
    Dropping,
    Sorted,
    Errored,
}

impl SortStatus {
    /// True for `Sorted` and `Errored` (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SortStatus::Sorted | SortStatus::Errored)
    }

    /// True for the states occupying the scanning/conveyor station
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SortStatus::Scanning | SortStatus::Traveling | SortStatus::Dropping
        )
    }
}

impl std::fmt::Display for SortStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortStatus::Queued => write!(f, "queued"),
            SortStatus::Scanning => write!(f, "scanning"),
            SortStatus::Traveling => write!(f, "traveling"),
            SortStatus::Dropping => write!(f, "dropping"),
            SortStatus::Sorted => write!(f, "sorted"),
            SortStatus::Errored => write!(f, "errored"),
        }
    }
}

/// Overall machine status (sorting run in flight or not)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    Idle,
    Sorting,
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineState::Idle => write!(f, "idle"),
            MachineState::Sorting => write!(f, "sorting"),
        }
    }
}

/// A successful classification result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: RoastClass,
    /// Confidence score in [0, 1]
    pub confidence: f64,
}

/// Marker for a failed classification
///
/// This is a lifecycle outcome, not a fault: the item proceeds to the error
/// lane and is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("classification failed")]
pub struct ClassificationFailed;

/// Outcome of one classification call
pub type ClassifyOutcome = std::result::Result<Classification, ClassificationFailed>;

/// Read-surface projection of one item for presentation and collaborators
///
/// Cheap to clone; produced under a read lock and consumed without ever
/// blocking the sorting engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: Uuid,
    /// File name of the original upload (for display)
    pub file_name: String,
    /// Path of the renderable preview derived at ingestion
    pub preview_path: PathBuf,
    pub status: SortStatus,
    pub label: Option<RoastClass>,
    pub confidence: Option<f64>,
    pub is_error: bool,
}
