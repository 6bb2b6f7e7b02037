use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::detection::DetectionDump;
use crate::placements::{find_ad_slots, render_report, AdSlot};
use crate::segments::SegmentTracker;

/// Analysis outcome for a single detection dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// The detection dump that was analyzed
    pub input_path: PathBuf,
    /// Where the report was written
    pub report_path: PathBuf,
    /// Slots found, in chronological order
    pub slots: Vec<AdSlot>,
    /// Detections in the dump
    pub detections_total: usize,
    /// Detections that passed the significance filter
    pub detections_significant: usize,
}

/// Overall batch analysis results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub slots_found: usize,
    pub total_time: Duration,
    pub results: Vec<FileAnalysis>,
}

/// Batch analyzer for exported text-detection dumps.
///
/// Takes a single dump file or a directory of them, finds the ad-insertion
/// windows in each, and writes one report per input. A failure on one input
/// is logged and counted but does not abort the batch.
pub struct AnalysisRunner {
    config: Config,
}

impl AnalysisRunner {
    /// Create a runner with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Analyze a dump file or every dump in a directory
    pub async fn run(&self, input: &Path) -> Result<AnalysisSummary> {
        let start_time = Instant::now();
        let dumps = self.discover_dumps(input)?;

        info!("🔍 Found {} detection dump(s) to analyze", dumps.len());

        let mut summary = AnalysisSummary {
            total: dumps.len(),
            successful: 0,
            failed: 0,
            skipped: 0,
            slots_found: 0,
            total_time: Duration::ZERO,
            results: Vec::new(),
        };

        for dump_path in dumps {
            let report_path = self.report_path_for(&dump_path);

            if self.config.output.skip_existing && report_path.exists() {
                info!("⏭️  Skipping {} (report exists)", dump_path.display());
                summary.skipped += 1;
                continue;
            }

            match self.analyze_file(&dump_path, &report_path).await {
                Ok(analysis) => {
                    info!(
                        "✅ {}: {} slot(s) found",
                        dump_path.display(),
                        analysis.slots.len()
                    );
                    summary.successful += 1;
                    summary.slots_found += analysis.slots.len();
                    summary.results.push(analysis);
                }
                Err(e) => {
                    error!("❌ Failed to analyze {}: {:#}", dump_path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        summary.total_time = start_time.elapsed();
        info!(
            "🏁 Batch complete: {} successful, {} failed, {} skipped in {:.2}s",
            summary.successful,
            summary.failed,
            summary.skipped,
            summary.total_time.as_secs_f64()
        );

        Ok(summary)
    }

    /// Analyze one dump file and write its report
    pub async fn analyze_file(&self, input: &Path, report_path: &Path) -> Result<FileAnalysis> {
        let json = tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read detection dump {}", input.display()))?;

        let dump = DetectionDump::from_json(&json)
            .with_context(|| format!("Failed to parse detection dump {}", input.display()))?;

        let (slots, significant) = self.analyze_dump(&dump)?;

        // An empty report is still a result worth recording
        let report = render_report(&slots);
        if let Some(parent) = report_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(report_path, &report)
            .await
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;

        debug!(
            "Report for {} written to {}",
            input.display(),
            report_path.display()
        );

        Ok(FileAnalysis {
            input_path: input.to_path_buf(),
            report_path: report_path.to_path_buf(),
            slots,
            detections_total: dump.text_detections.len(),
            detections_significant: significant,
        })
    }

    /// Run the slot-finding pipeline over an in-memory dump.
    ///
    /// Returns the slots plus the number of detections that passed the
    /// significance filter.
    pub fn analyze_dump(&self, dump: &DetectionDump) -> Result<(Vec<AdSlot>, usize)> {
        let mut tracker = SegmentTracker::new(self.config.min_ad_duration());
        let mut significant = 0;

        for detection in &dump.text_detections {
            let text = &detection.text_detection;
            debug!(
                timestamp = detection.timestamp,
                text = %text.detected_text,
                width = text.geometry.bounding_box.width,
                confidence = text.confidence,
                "detection"
            );
            if detection.is_significant(self.config.analysis.min_word_width) {
                significant += 1;
                tracker.add_detection(detection.timestamp)?;
            }
        }

        debug!(
            "Accumulated {} text segment(s) from {} significant detection(s)",
            tracker.len(),
            significant
        );

        let min_ad_duration_ms = tracker.min_ad_duration_ms();
        let slots = find_ad_slots(
            &tracker.into_segments(),
            dump.video_length_ms(),
            min_ad_duration_ms,
            self.config.analysis.slot_padding_ms,
        )?;

        Ok((slots, significant))
    }

    /// Collect dump files from a file or directory input
    fn discover_dumps(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }

        if !input.is_dir() {
            return Err(anyhow!("Input path does not exist: {}", input.display()));
        }

        let mut dumps = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            {
                dumps.push(entry.path().to_path_buf());
            }
        }

        dumps.sort();
        Ok(dumps)
    }

    /// Report path for a given dump: input stem plus the configured suffix,
    /// next to the input unless a report directory is set
    fn report_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "detection".to_string());
        let file_name = format!("{}{}", stem, self.config.output.report_suffix);

        match &self.config.output.report_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }
}
