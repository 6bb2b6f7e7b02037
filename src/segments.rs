use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Errors raised while accumulating text-presence segments
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SegmentError {
    #[error("out-of-order detection: timestamp {timestamp_ms}ms precedes last segment end {last_end_ms}ms")]
    OutOfOrderTimestamp { timestamp_ms: u64, last_end_ms: u64 },
}

/// A closed interval [start, end] in milliseconds during which on-screen
/// text was present (possibly merge-extended across nearby detections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Start of the interval in milliseconds
    pub start_ms: u64,
    /// End of the interval in milliseconds (always >= start_ms)
    pub end_ms: u64,
}

impl TextSegment {
    /// Create a zero-length segment at a single timestamp
    pub fn at(timestamp_ms: u64) -> Self {
        Self {
            start_ms: timestamp_ms,
            end_ms: timestamp_ms,
        }
    }

    /// Duration covered by this segment
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Accumulates time-ordered text-detection timestamps into merged
/// text-presence segments.
///
/// Detections closer together than the minimum ad duration cannot host an
/// ad between them, so the same threshold that qualifies a gap as an ad
/// slot also decides whether two detections belong to one segment.
///
/// This is the accumulation half of a two-phase pipeline: feed every
/// significant detection in timestamp order, then consume the tracker with
/// [`SegmentTracker::into_segments`] and hand the immutable list to
/// [`crate::placements::find_ad_slots`]. Single-owner type; not meant to be
/// shared across tasks.
#[derive(Debug, Clone)]
pub struct SegmentTracker {
    min_ad_duration_ms: u64,
    segments: Vec<TextSegment>,
}

impl SegmentTracker {
    /// Create a tracker with the given minimum ad duration (also the
    /// merge-distance threshold between detections).
    pub fn new(min_ad_duration: Duration) -> Self {
        Self {
            min_ad_duration_ms: min_ad_duration.as_millis() as u64,
            segments: Vec::new(),
        }
    }

    /// Merge threshold in milliseconds
    pub fn min_ad_duration_ms(&self) -> u64 {
        self.min_ad_duration_ms
    }

    /// Record a qualifying text detection.
    ///
    /// Opens a new segment when the timestamp is at least the merge
    /// threshold past the end of the latest segment (or when no segment
    /// exists yet); otherwise extends the latest segment.
    ///
    /// Timestamps must be non-decreasing. Equal timestamps are fine (one
    /// sampled frame can yield several words); an earlier timestamp is a
    /// contract violation and is rejected rather than silently mis-merged.
    pub fn add_detection(&mut self, timestamp_ms: u64) -> Result<(), SegmentError> {
        match self.segments.last_mut() {
            None => {
                debug!(timestamp_ms, "starting first text segment");
                self.segments.push(TextSegment::at(timestamp_ms));
            }
            Some(last) => {
                if timestamp_ms < last.end_ms {
                    return Err(SegmentError::OutOfOrderTimestamp {
                        timestamp_ms,
                        last_end_ms: last.end_ms,
                    });
                }
                if timestamp_ms - last.end_ms < self.min_ad_duration_ms {
                    debug!(timestamp_ms, segment_start_ms = last.start_ms, "extending text segment");
                    last.end_ms = timestamp_ms;
                } else {
                    debug!(timestamp_ms, "opening new text segment");
                    self.segments.push(TextSegment::at(timestamp_ms));
                }
            }
        }
        Ok(())
    }

    /// Segments accumulated so far
    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    /// Number of segments accumulated so far
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if no detections have been recorded yet
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Consume the tracker, yielding the immutable segment list for
    /// finalization.
    pub fn into_segments(self) -> Vec<TextSegment> {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_15s() -> SegmentTracker {
        SegmentTracker::new(Duration::from_secs(15))
    }

    #[test]
    fn test_first_detection_opens_segment() {
        let mut tracker = tracker_15s();
        tracker.add_detection(1000).unwrap();

        assert_eq!(tracker.segments(), &[TextSegment { start_ms: 1000, end_ms: 1000 }]);
    }

    #[test]
    fn test_detections_within_threshold_merge_into_one_segment() {
        let mut tracker = tracker_15s();
        for ts in [1000, 2000, 9000, 14000] {
            tracker.add_detection(ts).unwrap();
        }

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.segments()[0], TextSegment { start_ms: 1000, end_ms: 14000 });
    }

    #[test]
    fn test_detections_spaced_beyond_threshold_never_merge() {
        let mut tracker = tracker_15s();
        let timestamps = [0, 16000, 32000, 48000];
        for ts in timestamps {
            tracker.add_detection(ts).unwrap();
        }

        // One segment per detection
        assert_eq!(tracker.len(), timestamps.len());
        for (segment, ts) in tracker.segments().iter().zip(timestamps) {
            assert_eq!(*segment, TextSegment::at(ts));
        }
    }

    #[test]
    fn test_gap_exactly_at_threshold_opens_new_segment() {
        let mut tracker = tracker_15s();
        tracker.add_detection(1000).unwrap();
        tracker.add_detection(16000).unwrap();

        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_gap_just_under_threshold_extends() {
        let mut tracker = tracker_15s();
        tracker.add_detection(1000).unwrap();
        tracker.add_detection(15999).unwrap();

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.segments()[0].end_ms, 15999);
    }

    #[test]
    fn test_equal_timestamp_is_accepted() {
        let mut tracker = tracker_15s();
        tracker.add_detection(5000).unwrap();
        tracker.add_detection(5000).unwrap();

        assert_eq!(tracker.segments(), &[TextSegment::at(5000)]);
    }

    #[test]
    fn test_out_of_order_timestamp_is_rejected() {
        let mut tracker = tracker_15s();
        tracker.add_detection(5000).unwrap();
        let err = tracker.add_detection(4999).unwrap_err();

        assert_eq!(
            err,
            SegmentError::OutOfOrderTimestamp { timestamp_ms: 4999, last_end_ms: 5000 }
        );
        // Rejected input must not corrupt the accumulated state
        assert_eq!(tracker.segments(), &[TextSegment::at(5000)]);
    }

    #[test]
    fn test_merge_tracks_latest_and_earliest_timestamps() {
        let mut tracker = SegmentTracker::new(Duration::from_secs(10));
        for ts in [3000, 4000, 12000, 21000] {
            tracker.add_detection(ts).unwrap();
        }

        let segments = tracker.into_segments();
        assert_eq!(segments, vec![TextSegment { start_ms: 3000, end_ms: 21000 }]);
    }
}
