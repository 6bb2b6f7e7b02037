//! Ad Break Analyzer
//!
//! Finds candidate advertisement-insertion windows in a video from the
//! results of an on-screen text-detection job: timestamps with significant
//! text are merged into text-presence segments, and the gaps between them
//! that are long enough to host an ad are reported as `HH:MM:SS` ranges.

pub mod config;
pub mod detection;
pub mod placements;
pub mod processing;
pub mod segments;

// Re-export main types for easy access
pub use crate::config::{AnalysisConfig, Config, ConfigBuilder, OutputConfig};
pub use crate::detection::{DetectionDump, TextDetection, TextDetectionType, TimedTextDetection};
pub use crate::placements::{
    find_ad_slots, format_timestamp, render_report, AdSlot, PlacementError,
    DEFAULT_SLOT_PADDING_MS,
};
pub use crate::processing::{AnalysisRunner, AnalysisSummary, FileAnalysis};
pub use crate::segments::{SegmentError, SegmentTracker, TextSegment};
