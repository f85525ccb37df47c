//! Touch sequence tracking and classification
//!
//! A sequence covers one physical contact, from the tracking id being
//! assigned until it is released. Every appended point updates the size
//! ranges and re-derives the down/up and palm state:
//!
//! - down/up uses hysteresis: below `up` releases, above `down` presses, and
//!   anything in between keeps the previous state.
//! - palm is recomputed per point; `was_palm` latches for the whole sequence.

use crate::config::Thresholds;
use crate::range::{Latch, RangeAccumulator, Span};
use crate::sample::TouchPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle and classification state of one contact
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    tracking_id: i32,
    thresholds: Thresholds,
    points: Vec<TouchPoint>,
    is_active: bool,
    is_down: bool,
    was_down: Latch,
    is_palm: bool,
    was_palm: Latch,
    major_range: RangeAccumulator,
    minor_range: RangeAccumulator,
}

impl SequenceTracker {
    pub fn new(tracking_id: i32, thresholds: Thresholds) -> Self {
        Self {
            tracking_id,
            thresholds,
            points: Vec::new(),
            is_active: true,
            is_down: false,
            was_down: Latch::default(),
            is_palm: false,
            was_palm: Latch::default(),
            major_range: RangeAccumulator::new(),
            minor_range: RangeAccumulator::new(),
        }
    }

    /// Record a point and reclassify.
    ///
    /// Must not be called after [`SequenceTracker::finalize`].
    pub fn append(&mut self, point: TouchPoint) {
        debug_assert!(
            self.is_active,
            "append to finalized sequence {}",
            self.tracking_id
        );

        self.points.push(point);
        self.major_range.update(point.major);
        if let Some(minor) = point.minor {
            self.minor_range.update(minor);
        }

        let (down, up, palm) = (
            self.thresholds.down(),
            self.thresholds.up(),
            self.thresholds.palm(),
        );
        let below_up = point.major < up || point.minor.is_some_and(|m| m < up);
        let above_down = point.major > down || point.minor.is_some_and(|m| m > down);

        if below_up {
            self.is_down = false;
        } else if above_down {
            self.is_down = true;
        }
        self.was_down.observe(self.is_down);

        self.is_palm = point.major > palm;
        self.was_palm.observe(self.is_palm);
    }

    /// Mark the contact as lifted. Irreversible.
    pub fn finalize(&mut self) {
        self.is_active = false;
    }

    pub fn tracking_id(&self) -> i32 {
        self.tracking_id
    }

    pub fn points(&self) -> &[TouchPoint] {
        &self.points
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_down(&self) -> bool {
        self.is_down
    }

    pub fn was_down(&self) -> bool {
        self.was_down.get()
    }

    pub fn is_palm(&self) -> bool {
        self.is_palm
    }

    pub fn was_palm(&self) -> bool {
        self.was_palm.get()
    }

    pub fn major_range(&self) -> &RangeAccumulator {
        &self.major_range
    }

    pub fn minor_range(&self) -> &RangeAccumulator {
        &self.minor_range
    }

    /// Latest point with its instantaneous tags, if any point was recorded
    pub fn state(&self) -> Option<SequenceState> {
        self.points.last().map(|point| SequenceState {
            tracking_id: self.tracking_id,
            point: *point,
            is_down: self.is_down,
            is_palm: self.is_palm,
        })
    }

    pub fn summary(&self) -> SequenceSummary {
        SequenceSummary {
            tracking_id: self.tracking_id,
            samples: self.points.len(),
            major: self.major_range.to_span(),
            minor: self.minor_range.to_span(),
            was_down: self.was_down(),
            was_palm: self.was_palm(),
        }
    }
}

/// Per-frame view of an active sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    pub tracking_id: i32,
    pub point: TouchPoint,
    pub is_down: bool,
    pub is_palm: bool,
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, tags: {} {}",
            self.point,
            if self.is_down { "down" } else { "    " },
            if self.is_palm { "palm" } else { "    " },
        )
    }
}

/// Result of a finished sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub tracking_id: i32,
    pub samples: usize,
    /// `None` when no point was recorded
    pub major: Option<Span>,
    /// `None` when no point was recorded or the device has no minor axis
    pub minor: Option<Span>,
    pub was_down: bool,
    pub was_palm: bool,
}

impl SequenceSummary {
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

impl fmt::Display for SequenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(major) = self.major else {
            return write!(f, "Sequence: no major/minor values recorded");
        };

        write!(f, "Sequence: major: [{:3}..{:3}]", major.min, major.max)?;
        if let Some(minor) = self.minor {
            write!(f, " minor: [{:3}..{:3}]", minor.min, minor.max)?;
        }
        if self.was_down {
            write!(f, " down")?;
        }
        if self.was_palm {
            write!(f, " palm")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn thresholds(down: i32, up: i32, palm: i32) -> Thresholds {
        Thresholds::new(down, up, palm).unwrap()
    }

    fn tracker_after(majors: &[i32], t: Thresholds) -> SequenceTracker {
        let mut seq = SequenceTracker::new(1, t);
        for &m in majors {
            seq.append(TouchPoint::new(m));
        }
        seq
    }

    #[test]
    fn test_new_sequence_is_active_and_untagged() {
        let seq = SequenceTracker::new(7, thresholds(20, 10, 50));
        assert!(seq.is_active());
        assert!(!seq.is_down());
        assert!(!seq.was_down());
        assert!(!seq.is_palm());
        assert!(!seq.was_palm());
        assert_eq!(seq.state(), None);
    }

    #[test]
    fn test_between_thresholds_keeps_previous_state() {
        let t = thresholds(20, 10, 100);

        let seq = tracker_after(&[5, 15], t);
        assert!(!seq.is_down());

        let seq = tracker_after(&[25, 15], t);
        assert!(seq.is_down());
    }

    #[test]
    fn test_hysteresis_press_and_release() {
        let t = thresholds(20, 10, 100);
        let mut seq = SequenceTracker::new(1, t);

        let expected = [
            (12, false),
            (21, true),
            (19, true),
            (10, true),
            (9, false),
            (15, false),
            (20, false),
            (30, true),
        ];
        for (major, down) in expected {
            seq.append(TouchPoint::new(major));
            assert_eq!(seq.is_down(), down, "after major {}", major);
        }
    }

    #[test]
    fn test_minor_participates_with_or_semantics() {
        let t = thresholds(20, 10, 100);

        // minor below up releases even with a large major
        let mut seq = SequenceTracker::new(1, t);
        seq.append(TouchPoint::new(30));
        assert!(seq.is_down());
        seq.append(TouchPoint::new(30).with_minor(5));
        assert!(!seq.is_down());

        // minor above down presses even with a mid-range major
        let mut seq = SequenceTracker::new(1, t);
        seq.append(TouchPoint::new(15).with_minor(25));
        assert!(seq.is_down());
    }

    #[test]
    fn test_release_check_takes_priority() {
        // major above down, minor below up: release wins
        let t = thresholds(20, 10, 100);
        let mut seq = SequenceTracker::new(1, t);
        seq.append(TouchPoint::new(40).with_minor(3));
        assert!(!seq.is_down());
        assert!(!seq.was_down());
    }

    #[test]
    fn test_was_down_is_sticky() {
        let seq = tracker_after(&[25, 5, 1], thresholds(20, 10, 100));
        assert!(!seq.is_down());
        assert!(seq.was_down());
    }

    #[test]
    fn test_palm_is_instant_and_was_palm_is_sticky() {
        let mut seq = SequenceTracker::new(1, thresholds(20, 10, 50));
        seq.append(TouchPoint::new(60));
        assert!(seq.is_palm());
        assert!(seq.was_palm());

        seq.append(TouchPoint::new(40));
        assert!(!seq.is_palm());
        assert!(seq.was_palm());

        // equal to the threshold is not a palm
        let seq = tracker_after(&[50], thresholds(20, 10, 50));
        assert!(!seq.was_palm());
    }

    #[test]
    fn test_ranges_track_major_and_minor() {
        let mut seq = SequenceTracker::new(1, thresholds(20, 10, 50));
        seq.append(TouchPoint::new(12).with_minor(8));
        seq.append(TouchPoint::new(30).with_minor(4));
        seq.append(TouchPoint::new(18));

        assert_eq!(seq.major_range().bounds(), Some((12, 30)));
        assert_eq!(seq.minor_range().bounds(), Some((4, 8)));
    }

    #[test]
    fn test_summary_for_full_press() {
        let mut seq = tracker_after(&[10, 40, 60, 90, 60, 20], thresholds(50, 30, 80));
        seq.finalize();

        assert!(!seq.is_active());
        assert!(!seq.is_down());
        assert_eq!(
            seq.summary(),
            SequenceSummary {
                tracking_id: 1,
                samples: 6,
                major: Some(Span { min: 10, max: 90 }),
                minor: None,
                was_down: true,
                was_palm: true,
            }
        );
        assert_eq!(
            seq.summary().to_string(),
            "Sequence: major: [ 10.. 90] down palm"
        );
    }

    #[test]
    fn test_summary_with_minor() {
        let mut seq = SequenceTracker::new(3, thresholds(50, 30, 80));
        seq.append(TouchPoint::new(40).with_minor(35));
        seq.finalize();
        assert_eq!(
            seq.summary().to_string(),
            "Sequence: major: [ 40.. 40] minor: [ 35.. 35]"
        );
    }

    #[test]
    fn test_empty_summary() {
        let mut seq = SequenceTracker::new(4, thresholds(50, 30, 80));
        seq.finalize();

        let summary = seq.summary();
        assert!(summary.is_empty());
        assert_eq!(summary.major, None);
        assert_eq!(summary.to_string(), "Sequence: no major/minor values recorded");
    }

    #[test]
    fn test_state_display() {
        let mut seq = SequenceTracker::new(1, thresholds(20, 10, 50));
        seq.append(TouchPoint::new(60).with_minor(40));
        let state = seq.state().unwrap();
        assert_eq!(state.to_string(), "major:  60, minor:  40, tags: down palm");

        seq.append(TouchPoint::new(15).with_minor(12));
        let state = seq.state().unwrap();
        assert_eq!(state.to_string(), "major:  15, minor:  12, tags: down     ");
    }
}
