use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::placements::DEFAULT_SLOT_PADDING_MS;

/// Configuration for the Ad Break Analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Slot-finding parameters
    pub analysis: AnalysisConfig,

    /// Output and report settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum ad length in seconds; also the merge-distance threshold
    /// between detections
    pub min_ad_duration_secs: u64,

    /// Minimum word bounding-box width, as a fraction of frame width;
    /// narrower words are treated as incidental text
    pub min_word_width: f64,

    /// Inward padding between detected text and a proposed slot, in
    /// milliseconds
    pub slot_padding_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for reports; reports land next to their input when unset
    pub report_dir: Option<PathBuf>,

    /// Suffix appended to the input file stem for the report filename
    pub report_suffix: String,

    /// Skip inputs whose report already exists
    pub skip_existing: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "adbreak-analyzer.toml",
            "config/adbreak-analyzer.toml",
            "~/.config/adbreak-analyzer/config.toml",
            "/etc/adbreak-analyzer/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Try environment variables
        if let Ok(config) = Self::from_env() {
            return Ok(config);
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(secs) = std::env::var("ADBREAK_MIN_AD_DURATION_SECS") {
            config.analysis.min_ad_duration_secs = secs.parse().unwrap_or(15);
        }

        if let Ok(width) = std::env::var("ADBREAK_MIN_WORD_WIDTH") {
            config.analysis.min_word_width = width.parse().unwrap_or(0.05);
        }

        if let Ok(padding) = std::env::var("ADBREAK_SLOT_PADDING_MS") {
            config.analysis.slot_padding_ms = padding.parse().unwrap_or(DEFAULT_SLOT_PADDING_MS);
        }

        if let Ok(report_dir) = std::env::var("ADBREAK_REPORT_DIR") {
            config.output.report_dir = Some(PathBuf::from(report_dir));
        }

        if let Ok(log_level) = std::env::var("ADBREAK_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.analysis.min_ad_duration_secs == 0 {
            return Err(anyhow!("min_ad_duration_secs must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.analysis.min_word_width) {
            return Err(anyhow!(
                "min_word_width must be a fraction of frame width between 0.0 and 1.0"
            ));
        }

        if self.output.report_suffix.is_empty() {
            return Err(anyhow!("report_suffix must not be empty"));
        }

        Ok(())
    }

    /// Minimum ad duration as a Duration
    pub fn min_ad_duration(&self) -> Duration {
        Duration::from_secs(self.analysis.min_ad_duration_secs)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Ad Break Analyzer Configuration:\n\
            - Minimum Ad Duration: {}s\n\
            - Minimum Word Width: {}\n\
            - Slot Padding: {}ms\n\
            - Report Suffix: {}\n\
            - Skip Existing: {}",
            self.analysis.min_ad_duration_secs,
            self.analysis.min_word_width,
            self.analysis.slot_padding_ms,
            self.output.report_suffix,
            self.output.skip_existing
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig {
                min_ad_duration_secs: 15,
                min_word_width: 0.05, // filters incidental background text
                slot_padding_ms: DEFAULT_SLOT_PADDING_MS,
            },
            output: OutputConfig {
                report_dir: None,
                report_suffix: "-results.txt".to_string(),
                skip_existing: true,
                log_level: "info".to_string(),
            },
        }
    }
}

/// Builder for programmatic configuration
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_min_ad_duration_secs(mut self, secs: u64) -> Self {
        self.config.analysis.min_ad_duration_secs = secs;
        self
    }

    pub fn with_min_word_width(mut self, width: f64) -> Self {
        self.config.analysis.min_word_width = width;
        self
    }

    pub fn with_slot_padding_ms(mut self, padding_ms: u64) -> Self {
        self.config.analysis.slot_padding_ms = padding_ms;
        self
    }

    pub fn with_report_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.report_dir = Some(dir);
        self
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.config.output.skip_existing = skip;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
