use crate::segments::TextSegment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default inward padding between detected text and a proposed slot.
/// Upstream detectors sample video at roughly one-second intervals, so a
/// slot should not abut a detection more closely than one sample.
pub const DEFAULT_SLOT_PADDING_MS: u64 = 1000;

const MILLIS_PER_HOUR: u64 = 1000 * 60 * 60;
const MILLIS_PER_MINUTE: u64 = 1000 * 60;

/// Errors raised while finalizing segments into ad slots
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PlacementError {
    #[error("video length {video_length_ms}ms is shorter than the last detection at {last_end_ms}ms")]
    VideoShorterThanDetections { video_length_ms: u64, last_end_ms: u64 },
}

/// A candidate ad-insertion window, already padded away from detected text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdSlot {
    /// Earliest millisecond an ad may start
    pub start_ms: u64,
    /// Latest millisecond an ad may end
    pub end_ms: u64,
}

impl AdSlot {
    /// Length of the window
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

impl fmt::Display for AdSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Available slot from {} to {}, duration: {}",
            format_timestamp(self.start_ms),
            format_timestamp(self.end_ms),
            format_timestamp(self.duration_ms())
        )
    }
}

/// Compute the ad-insertion windows hiding between text-presence segments.
///
/// Pure function over an already-accumulated segment list (see
/// [`crate::segments::SegmentTracker`]): the caller's list is never mutated,
/// and finalization can be re-run with a different video length or padding.
///
/// The end of the video is treated as one more detection so that no slot can
/// run past the end of the media, and a synthetic zero-length segment is
/// placed at time zero when the opening silence is itself long enough to
/// host an ad. Every gap between adjacent segments is then padded inward by
/// `padding_ms` on both sides and kept only if the remainder is strictly
/// longer than `min_ad_duration_ms`.
pub fn find_ad_slots(
    segments: &[TextSegment],
    video_length_ms: u64,
    min_ad_duration_ms: u64,
    padding_ms: u64,
) -> Result<Vec<AdSlot>, PlacementError> {
    if let Some(last) = segments.last() {
        if video_length_ms < last.end_ms {
            return Err(PlacementError::VideoShorterThanDetections {
                video_length_ms,
                last_end_ms: last.end_ms,
            });
        }
    }

    // Close the timeline with an end-of-video sentinel, applying the same
    // merge rule as during accumulation: text running into the credits is
    // not followed by a slot.
    let mut timeline: Vec<TextSegment> = segments.to_vec();
    match timeline.last_mut() {
        Some(last) if video_length_ms - last.end_ms < min_ad_duration_ms => {
            last.end_ms = video_length_ms;
        }
        _ => timeline.push(TextSegment::at(video_length_ms)),
    }

    // Room for an ad before any text appears: represent the video start as
    // a zero-length segment so the pair scan below handles it uniformly.
    if timeline[0].start_ms > min_ad_duration_ms {
        timeline.insert(0, TextSegment::at(0));
    }

    let mut slots = Vec::new();
    for pair in timeline.windows(2) {
        let candidate_start = pair[0].end_ms as i64 + padding_ms as i64;
        let candidate_end = pair[1].start_ms as i64 - padding_ms as i64;
        // Signed arithmetic: segments closer together than the combined
        // padding produce a negative gap, which is simply not a slot.
        let gap_ms = candidate_end - candidate_start;
        if gap_ms > min_ad_duration_ms as i64 {
            slots.push(AdSlot {
                start_ms: candidate_start as u64,
                end_ms: candidate_end as u64,
            });
        }
    }

    Ok(slots)
}

/// Render slots as a report, one line per slot in chronological order.
/// No slots yields an empty string; that is a valid result, not an error.
pub fn render_report(slots: &[AdSlot]) -> String {
    slots
        .iter()
        .map(AdSlot::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a millisecond count as zero-padded `HH:MM:SS`.
///
/// Truncating integer division throughout; no rounding, no sub-second
/// component. Hours are not wrapped at 24 and the field widens naturally
/// past 99.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / MILLIS_PER_HOUR;
    let remainder = ms % MILLIS_PER_HOUR;
    let minutes = remainder / MILLIS_PER_MINUTE;
    let seconds = (remainder % MILLIS_PER_MINUTE) / 1000;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentTracker;
    use std::time::Duration;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00:00");
        assert_eq!(format_timestamp(999), "00:00:00");
        assert_eq!(format_timestamp(3_661_000), "01:01:01");
        assert_eq!(format_timestamp(59_999), "00:00:59");
        assert_eq!(format_timestamp(36_000_000), "10:00:00");
    }

    #[test]
    fn test_format_timestamp_does_not_wrap_hours() {
        // 100 hours: the hour field widens rather than wrapping
        assert_eq!(format_timestamp(100 * 3_600_000), "100:00:00");
    }

    #[test]
    fn test_two_slots_found_between_sparse_detections() {
        // 60s video, detections at 1s and 40s, 15s minimum ad
        let mut tracker = SegmentTracker::new(Duration::from_secs(15));
        tracker.add_detection(1000).unwrap();
        tracker.add_detection(40000).unwrap();
        let segments = tracker.into_segments();

        let slots = find_ad_slots(&segments, 60000, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert_eq!(
            slots,
            vec![
                AdSlot { start_ms: 2000, end_ms: 39000 },
                AdSlot { start_ms: 41000, end_ms: 59000 },
            ]
        );
        assert_eq!(
            render_report(&slots),
            "Available slot from 00:00:02 to 00:00:39, duration: 00:00:37\n\
             Available slot from 00:00:41 to 00:00:59, duration: 00:00:18"
        );
    }

    #[test]
    fn test_video_with_no_text_yields_one_slot() {
        // 5s video, no detections at all, 1s minimum ad: the end-of-video
        // sentinel plus the synthetic leading segment frame a single gap
        let slots = find_ad_slots(&[], 5000, 1000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert_eq!(slots, vec![AdSlot { start_ms: 1000, end_ms: 4000 }]);
        assert_eq!(
            render_report(&slots),
            "Available slot from 00:00:01 to 00:00:04, duration: 00:00:03"
        );
    }

    #[test]
    fn test_no_leading_segment_when_text_appears_early() {
        // First detection at 1s with a 15s threshold: no room before it
        let segments = vec![TextSegment::at(1000), TextSegment::at(40000)];
        let slots = find_ad_slots(&segments, 60000, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert!(slots.iter().all(|slot| slot.start_ms >= 1000));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_gap_exactly_at_threshold_is_excluded() {
        // Padded gap of exactly 15000ms must not qualify (strict inequality):
        // [0,1000] then [18000,18000] gives candidate [2000,17000]
        let segments = vec![
            TextSegment { start_ms: 0, end_ms: 1000 },
            TextSegment::at(18000),
        ];
        let slots = find_ad_slots(&segments, 18000, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert!(slots.is_empty());
    }

    #[test]
    fn test_gap_one_ms_over_threshold_is_included() {
        let segments = vec![
            TextSegment { start_ms: 0, end_ms: 1000 },
            TextSegment::at(18001),
        ];
        let slots = find_ad_slots(&segments, 18001, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert_eq!(slots, vec![AdSlot { start_ms: 2000, end_ms: 17001 }]);
    }

    #[test]
    fn test_segments_closer_than_combined_padding_do_not_underflow() {
        // 500ms between segments is less than 2x 1000ms padding: the
        // candidate gap is negative and must be skipped, not panic
        let segments = vec![
            TextSegment { start_ms: 0, end_ms: 10000 },
            TextSegment { start_ms: 10500, end_ms: 20000 },
        ];
        let slots = find_ad_slots(&segments, 20000, 1000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert!(slots.is_empty());
    }

    #[test]
    fn test_text_near_end_of_video_merges_with_sentinel() {
        // Detection 5s before the end with a 15s threshold: the sentinel
        // extends the last segment, so no slot is proposed over the credits
        let segments = vec![TextSegment::at(1000), TextSegment::at(55000)];
        let slots = find_ad_slots(&segments, 60000, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert_eq!(slots, vec![AdSlot { start_ms: 2000, end_ms: 54000 }]);
    }

    #[test]
    fn test_video_shorter_than_detections_is_rejected() {
        let segments = vec![TextSegment::at(30000)];
        let err = find_ad_slots(&segments, 20000, 15000, DEFAULT_SLOT_PADDING_MS).unwrap_err();

        assert_eq!(
            err,
            PlacementError::VideoShorterThanDetections {
                video_length_ms: 20000,
                last_end_ms: 30000,
            }
        );
    }

    #[test]
    fn test_zero_length_video_with_no_detections() {
        let slots = find_ad_slots(&[], 0, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_finalization_leaves_input_untouched() {
        let segments = vec![TextSegment::at(1000), TextSegment::at(40000)];
        let before = segments.clone();
        let _ = find_ad_slots(&segments, 60000, 15000, DEFAULT_SLOT_PADDING_MS).unwrap();

        assert_eq!(segments, before);
    }

    #[test]
    fn test_slot_display_format() {
        let slot = AdSlot { start_ms: 3_661_000, end_ms: 7_322_000 };
        assert_eq!(
            slot.to_string(),
            "Available slot from 01:01:01 to 02:02:02, duration: 01:01:01"
        );
    }

    #[test]
    fn test_empty_report_for_no_slots() {
        assert_eq!(render_report(&[]), "");
    }
}
