//! Destination and travel-duration geometry for the sorting machine
//!
//! Maps a classification outcome to the horizontal offset of the lane the
//! item lands in and the duration of the travel animation. The engine uses
//! the duration to hold the `Traveling` state; presentation layers call the
//! same function with the same inputs to drive the animation, so the two
//! must agree bit-for-bit. Everything here is pure and deterministic.
//!
//! The coordinate origin is the scanning position. Lanes sit to its right at
//! a fixed pitch, with a dedicated error lane one slot past the last class
//! lane.

use crate::types::RoastClass;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default distance from the scanner origin to the first lane's start, in
/// pixels (scanner footprint 300 + gap 48)
pub const DEFAULT_START_X: f64 = 348.0;

/// Default center-to-center lane spacing, in pixels (lane 100 + gap 16)
pub const DEFAULT_LANE_PITCH: f64 = 116.0;

/// Default centering tweak applied on top of a lane's start offset
pub const DEFAULT_LANE_NUDGE: f64 = 20.0;

/// Default base travel speed, pixels per second
pub const DEFAULT_PX_PER_SEC: f64 = 220.0;

/// Default travel duration clamp bounds, seconds
pub const DEFAULT_MIN_DURATION: f64 = 0.6;
pub const DEFAULT_MAX_DURATION: f64 = 4.5;

/// Where an item lands and how long the motion takes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Horizontal offset from the scanner origin, in pixels
    pub offset: f64,
    /// Travel duration in seconds, already clamped
    pub duration_secs: f64,
}

/// Fixed visual geometry of the scanner-and-lanes row
///
/// Defaults match the rendered layout; a presentation layer with different
/// dimensions supplies its own and hands the same values to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    /// Offset from the scanner origin to the first lane's start
    pub start_x: f64,
    /// Center-to-center spacing between adjacent lanes
    pub lane_pitch: f64,
    /// Centering tweak added to class-lane and error-lane offsets
    pub lane_nudge: f64,
    /// Base travel speed
    pub px_per_sec: f64,
    /// Lower clamp bound for travel duration, seconds
    pub min_duration: f64,
    /// Upper clamp bound for travel duration, seconds
    pub max_duration: f64,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            start_x: DEFAULT_START_X,
            lane_pitch: DEFAULT_LANE_PITCH,
            lane_nudge: DEFAULT_LANE_NUDGE,
            px_per_sec: DEFAULT_PX_PER_SEC,
            min_duration: DEFAULT_MIN_DURATION,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }
}

impl LaneLayout {
    /// Compute where an outcome lands and how long the travel takes
    ///
    /// `classes` is the left-to-right lane ordering and must be non-empty
    /// for non-error outcomes. An error outcome resolves to the dedicated
    /// error lane one slot past the last class lane, regardless of `label`.
    /// A missing or unknown label degrades to the first lane's start offset
    /// rather than failing; that path is logged because it normally means a
    /// configuration mismatch between classifier and lane order.
    ///
    /// Duration is distance over base speed, slowed for far lanes: lanes at
    /// index 0 and 1 travel at base speed, each lane beyond that adds 25 %
    /// (the error lane counts as index `classes.len()`), then the result is
    /// clamped to `[min_duration, max_duration]`.
    pub fn destination(
        &self,
        label: Option<RoastClass>,
        is_error: bool,
        classes: &[RoastClass],
    ) -> Destination {
        let (offset, duration_index) = if is_error {
            (
                self.start_x + classes.len() as f64 * self.lane_pitch + self.lane_nudge,
                classes.len(),
            )
        } else {
            match label.and_then(|l| classes.iter().position(|c| *c == l)) {
                Some(idx) => (
                    self.start_x + idx as f64 * self.lane_pitch + self.lane_nudge,
                    idx,
                ),
                None => {
                    warn!(
                        ?label,
                        "classification label not in lane order, routing to fallback position"
                    );
                    (self.start_x, 0)
                }
            }
        };

        // Origin is the scanner; items only ever travel right, but take the
        // absolute value so a hypothetical left-of-origin layout still
        // yields a positive duration.
        let distance = offset.abs();
        let base = distance / self.px_per_sec;

        let multiplier = if duration_index > 1 {
            1.0 + (duration_index as f64 - 1.0) * 0.25
        } else {
            1.0
        };

        let duration_secs = (base * multiplier).clamp(self.min_duration, self.max_duration);

        Destination {
            offset,
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<RoastClass> {
        RoastClass::default_order()
    }

    #[test]
    fn test_class_lane_offsets() {
        let layout = LaneLayout::default();
        for (idx, class) in classes().iter().enumerate() {
            let dest = layout.destination(Some(*class), false, &classes());
            assert_eq!(
                dest.offset,
                348.0 + idx as f64 * 116.0 + 20.0,
                "offset mismatch for lane {}",
                idx
            );
        }
    }

    #[test]
    fn test_error_lane_offset() {
        let layout = LaneLayout::default();
        let dest = layout.destination(None, true, &classes());
        // One slot past the last class lane
        assert_eq!(dest.offset, 348.0 + 4.0 * 116.0 + 20.0);
        assert_eq!(dest.offset, 832.0);
    }

    #[test]
    fn test_error_lane_ignores_label() {
        let layout = LaneLayout::default();
        let with_label = layout.destination(Some(RoastClass::Dark), true, &classes());
        let without = layout.destination(None, true, &classes());
        assert_eq!(with_label, without);
    }

    #[test]
    fn test_fallback_offsets_match() {
        // Absent label and unknown label land at the same place: the first
        // lane's start, without the centering nudge.
        let layout = LaneLayout::default();
        let c = classes();
        let absent = layout.destination(None, false, &c);
        let unknown = layout.destination(Some(RoastClass::Medium), false, &c[..2]);
        assert_eq!(absent, unknown);
        assert_eq!(absent.offset, 348.0);
    }

    #[test]
    fn test_fallback_on_empty_class_list() {
        let layout = LaneLayout::default();
        let dest = layout.destination(Some(RoastClass::Dark), false, &[]);
        assert_eq!(dest.offset, 348.0);
    }

    #[test]
    fn test_determinism() {
        let layout = LaneLayout::default();
        for _ in 0..10 {
            let a = layout.destination(Some(RoastClass::Light), false, &classes());
            let b = layout.destination(Some(RoastClass::Light), false, &classes());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_monotonic_slowdown() {
        let layout = LaneLayout::default();
        let c = classes();
        let durations: Vec<f64> = (0..c.len())
            .map(|i| layout.destination(Some(c[i]), false, &c).duration_secs)
            .collect();

        assert!(durations[3] >= durations[2], "lane 3 should be >= lane 2");
        assert!(durations[2] >= durations[1], "lane 2 should be >= lane 1");

        let error_lane = layout.destination(None, true, &c).duration_secs;
        assert!(
            error_lane >= durations[3],
            "error lane should be slowest: {} vs {}",
            error_lane,
            durations[3]
        );
    }

    #[test]
    fn test_near_lanes_use_base_speed() {
        let layout = LaneLayout::default();
        let c = classes();

        // Lanes 0 and 1 get no multiplier: duration is pure distance/speed.
        for idx in 0..2 {
            let dest = layout.destination(Some(c[idx]), false, &c);
            let expected = (348.0 + idx as f64 * 116.0 + 20.0) / 220.0;
            assert!(
                (dest.duration_secs - expected).abs() < 1e-12,
                "lane {} duration {} != {}",
                idx,
                dest.duration_secs,
                expected
            );
        }
    }

    #[test]
    fn test_far_lane_multiplier() {
        let layout = LaneLayout::default();
        let c = classes();

        // Lane 2: base * 1.25, still under the max clamp
        let dest = layout.destination(Some(c[2]), false, &c);
        let expected = (348.0 + 2.0 * 116.0 + 20.0) / 220.0 * 1.25;
        assert!((dest.duration_secs - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_clamp() {
        let layout = LaneLayout::default();
        let c = classes();

        // Error lane raw duration: 832/220 * 1.75 = 6.618..s, clamped to 4.5
        let dest = layout.destination(None, true, &c);
        assert_eq!(dest.duration_secs, 4.5);

        // Lane 3 raw duration: 716/220 * 1.5 = 4.88..s, also clamped
        let lane3 = layout.destination(Some(c[3]), false, &c);
        assert_eq!(lane3.duration_secs, 4.5);
    }

    #[test]
    fn test_min_clamp() {
        // Shrink the layout until the raw duration drops below the floor.
        let layout = LaneLayout {
            start_x: 10.0,
            lane_pitch: 5.0,
            lane_nudge: 0.0,
            px_per_sec: 1000.0,
            ..LaneLayout::default()
        };
        let dest = layout.destination(Some(RoastClass::Dark), false, &classes());
        assert_eq!(dest.duration_secs, 0.6);
    }
}
