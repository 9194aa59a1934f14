//! Tunable machine parameters
//!
//! Compiled defaults, optionally overridden (field by field) from a TOML
//! file. Parameters are plain owned structs passed by reference to the
//! components that need them; there is no global registry.

use crate::error::{Error, Result};
use crate::geometry::LaneLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default scanner dwell before classification, ms
pub const DEFAULT_SCAN_HOLD_MS: u64 = 1500;

/// Default settle buffer after the travel animation lands, ms
pub const DEFAULT_TRAVEL_SETTLE_MS: u64 = 200;

/// Default drop animation hold, ms
pub const DEFAULT_DROP_HOLD_MS: u64 = 800;

/// Default pause between items, ms
pub const DEFAULT_INTER_ITEM_PAUSE_MS: u64 = 400;

/// Default stub classifier failure probability
pub const DEFAULT_ERROR_PROBABILITY: f64 = 0.15;

/// Default event bus capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Lifecycle hold durations for the sorting engine
///
/// These mirror the on-screen animation timings: the engine holds each state
/// exactly as long as the matching animation plays, so registry state and
/// visuals stay in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortTiming {
    /// Scanner dwell before the classification result is applied
    pub scan_hold_ms: u64,
    /// Extra hold after travel so the animation visually settles
    pub travel_settle_ms: u64,
    /// Hold while the item drops into its lane
    pub drop_hold_ms: u64,
    /// Pause before the next item starts scanning
    pub inter_item_pause_ms: u64,
}

impl Default for SortTiming {
    fn default() -> Self {
        Self {
            scan_hold_ms: DEFAULT_SCAN_HOLD_MS,
            travel_settle_ms: DEFAULT_TRAVEL_SETTLE_MS,
            drop_hold_ms: DEFAULT_DROP_HOLD_MS,
            inter_item_pause_ms: DEFAULT_INTER_ITEM_PAUSE_MS,
        }
    }
}

impl SortTiming {
    pub fn scan_hold(&self) -> Duration {
        Duration::from_millis(self.scan_hold_ms)
    }

    pub fn travel_settle(&self) -> Duration {
        Duration::from_millis(self.travel_settle_ms)
    }

    pub fn drop_hold(&self) -> Duration {
        Duration::from_millis(self.drop_hold_ms)
    }

    pub fn inter_item_pause(&self) -> Duration {
        Duration::from_millis(self.inter_item_pause_ms)
    }
}

/// Full machine parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineParams {
    pub timing: SortTiming,
    pub layout: LaneLayout,
    /// Failure probability used by the stub classifier, in [0, 1]
    pub error_probability: f64,
    /// Event bus channel capacity
    pub event_capacity: usize,
}

impl Default for MachineParams {
    fn default() -> Self {
        Self {
            timing: SortTiming::default(),
            layout: LaneLayout::default(),
            error_probability: DEFAULT_ERROR_PROBABILITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl MachineParams {
    /// Load parameters from a TOML file
    ///
    /// Missing fields keep their compiled defaults. Values are validated
    /// after parsing.
    pub fn load(path: &Path) -> Result<MachineParams> {
        let content = std::fs::read_to_string(path)?;
        let params: MachineParams = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid parameter file {}: {}", path.display(), e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(Error::Config(format!(
                "error_probability must be in [0, 1], got {}",
                self.error_probability
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be nonzero".to_string()));
        }
        if self.layout.px_per_sec <= 0.0 {
            return Err(Error::Config(format!(
                "px_per_sec must be positive, got {}",
                self.layout.px_per_sec
            )));
        }
        if self.layout.min_duration > self.layout.max_duration {
            return Err(Error::Config(format!(
                "min_duration {} exceeds max_duration {}",
                self.layout.min_duration, self.layout.max_duration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = MachineParams::default();
        assert_eq!(params.timing.scan_hold_ms, 1500);
        assert_eq!(params.timing.drop_hold_ms, 800);
        assert_eq!(params.error_probability, 0.15);
        assert_eq!(params.event_capacity, 100);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_duration_accessors() {
        let timing = SortTiming::default();
        assert_eq!(timing.scan_hold(), Duration::from_millis(1500));
        assert_eq!(timing.travel_settle(), Duration::from_millis(200));
        assert_eq!(timing.inter_item_pause(), Duration::from_millis(400));
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let params = MachineParams {
            error_probability: 1.5,
            ..MachineParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_clamp() {
        let mut params = MachineParams::default();
        params.layout.min_duration = 5.0;
        params.layout.max_duration = 1.0;
        assert!(params.validate().is_err());
    }
}
