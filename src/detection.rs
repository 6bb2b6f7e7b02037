use serde::{Deserialize, Serialize};

/// A complete text-detection result set for one video, as exported by the
/// detection stage of the pipeline. Field names mirror the upstream JSON
/// (PascalCase) so dumps can be analyzed without rewriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionDump {
    /// Metadata about the analyzed video
    pub video_metadata: VideoMetadata,

    /// Every detection the job produced, in timestamp order
    pub text_detections: Vec<TimedTextDetection>,
}

impl DetectionDump {
    /// Parse a dump from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total duration of the analyzed media in milliseconds
    pub fn video_length_ms(&self) -> u64 {
        self.video_metadata.duration_millis
    }
}

/// Metadata the detection job reports about the analyzed video
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoMetadata {
    /// Total video duration in milliseconds
    pub duration_millis: u64,
}

/// A text detection stamped with the video position it was observed at
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimedTextDetection {
    /// Video position of the detection, in milliseconds
    pub timestamp: u64,

    /// The detection itself
    pub text_detection: TextDetection,
}

impl TimedTextDetection {
    /// Whether this detection should count as on-screen text for ad-slot
    /// purposes.
    ///
    /// Detectors report both full lines and their constituent words; only
    /// WORD entries are considered, and really small words are probably
    /// incidental (a street sign in the background, a logo) and can be
    /// overlaid with an ad.
    pub fn is_significant(&self, min_word_width: f64) -> bool {
        self.text_detection.detection_type == TextDetectionType::Word
            && self.text_detection.geometry.bounding_box.width >= min_word_width
    }
}

/// One detected piece of text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextDetection {
    /// The recognized text
    pub detected_text: String,

    /// Whether this entry is a full line or a single word
    #[serde(rename = "Type")]
    pub detection_type: TextDetectionType,

    /// Detection confidence, 0-100
    pub confidence: f32,

    /// Where in the frame the text was found
    pub geometry: Geometry,
}

/// Granularity of a detection entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextDetectionType {
    /// A full detected line of text
    Line,
    /// A single word within a line
    Word,
}

/// Frame-relative location of a detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    /// Axis-aligned bounding box of the detected text
    pub bounding_box: BoundingBox,
}

/// Axis-aligned bounding box, all values as fractions of frame size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    /// Box width as a fraction of frame width
    pub width: f64,
    /// Box height as a fraction of frame height
    pub height: f64,
    /// Left edge as a fraction of frame width
    pub left: f64,
    /// Top edge as a fraction of frame height
    pub top: f64,
}
